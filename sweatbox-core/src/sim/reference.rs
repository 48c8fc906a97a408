//! Static reference data of the loaded facility.

use std::collections::BTreeSet;

use bevy::ecs::resource::Resource;
use store::{Destination, Facility, PrefRoute, PrefRouteType, Tables};

/// Facility, tables and preferred routes of the current session.
#[derive(Resource)]
pub struct Reference {
    pub facility: Facility,
    pub tables:   Tables,
    pub routes:   PrefRoutes,
}

impl Reference {
    /// Extracts the reference data of a data file.
    #[must_use]
    pub fn from_file(file: &store::File) -> Self {
        Self {
            facility: file.facility.clone(),
            tables:   file.tables.clone(),
            routes:   PrefRoutes::split(file.pref_routes.iter().cloned(), &file.facility.airport),
        }
    }

    /// Looks up a destination by ICAO code.
    #[must_use]
    pub fn destination(&self, icao: &str) -> Option<&Destination> {
        self.tables.destinations.get(icao)
    }
}

/// Preferred routes from the facility airport, by usable route type.
#[derive(Debug, Default, Clone)]
pub struct PrefRoutes {
    pub tec:  Vec<PrefRoute>,
    pub high: Vec<PrefRoute>,
}

impl PrefRoutes {
    /// Keeps the TEC and high-altitude routes whose origin is `origin`.
    ///
    /// `origin` may be given with or without the leading `K`.
    #[must_use]
    pub fn split(routes: impl IntoIterator<Item = PrefRoute>, origin: &str) -> Self {
        let origin = origin.strip_prefix('K').unwrap_or(origin);
        let mut out = Self::default();
        for route in routes {
            if route.origin != origin {
                continue;
            }
            match route.kind {
                PrefRouteType::Tec => out.tec.push(route),
                PrefRouteType::H => out.high.push(route),
                _ => {}
            }
        }
        out
    }

    pub fn get(&self, tec: bool) -> &[PrefRoute] { if tec { &self.tec } else { &self.high } }

    /// All usable routes ending at the ICAO destination.
    pub fn to_destination<'a>(&'a self, icao: &'a str) -> impl Iterator<Item = &'a PrefRoute> {
        self.tec
            .iter()
            .chain(&self.high)
            .filter(move |route| route.icao_destination() == icao)
    }

    /// ICAO destinations of routes that are missing from the destination table.
    #[must_use]
    pub fn unknown_destinations(&self, tables: &Tables) -> BTreeSet<String> {
        self.tec
            .iter()
            .chain(&self.high)
            .map(PrefRoute::icao_destination)
            .filter(|icao| !tables.destinations.contains_key(icao))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.tec.is_empty() && self.high.is_empty() }
}
