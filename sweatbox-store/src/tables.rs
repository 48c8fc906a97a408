use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::WeightedList;

/// Lookup tables used when generating and reviewing flight plans.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Tables {
    /// Known destinations keyed by ICAO code, e.g. `KBOS`.
    pub destinations:         BTreeMap<String, Destination>,
    /// Valid and spawnable cruise altitudes.
    pub altitudes:            Altitudes,
    /// Jets departing from airline gates.
    pub jet:                  AircraftCategory,
    /// Turboprops flying TEC routes.
    pub tec:                  AircraftCategory,
    /// Light aircraft departing VFR.
    pub ga:                   AircraftCategory,
    /// Equipment suffixes that a TEC turboprop must not file.
    pub tec_restricted_equipment: Vec<String>,
    /// The only equipment suffix a jet may file.
    pub jet_required_equipment: String,
    /// Airlines with their radio telephony.
    pub airlines:             Vec<Airline>,
    /// Destinations VFR aircraft with flight following may request.
    pub vfr_destinations:     Vec<String>,
    /// Directions VFR aircraft without flight following depart to, e.g. `northwest`.
    pub departure_directions: Vec<String>,
}

impl Tables {
    /// Looks up an airline by its ICAO code.
    #[must_use]
    pub fn airline(&self, icao: &str) -> Option<&Airline> {
        self.airlines.iter().find(|airline| airline.icao == icao)
    }
}

/// A destination airport.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Destination {
    /// Spoken name of the airport, e.g. `Boston`.
    pub name:      String,
    /// Which side of the altitude table applies when flying there.
    pub direction: Direction,
}

/// The direction of flight that determines the altitude parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Westbound, even altitudes.
    West,
    /// Eastbound, odd altitudes.
    East,
}

/// Altitude tables in hundreds of feet, formatted as three digits, e.g. `240`.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Altitudes {
    /// Valid altitudes for high-altitude (`H`) routes.
    pub high:           DirectionalAltitudes,
    /// Valid altitudes for TEC routes.
    pub tec:            DirectionalAltitudes,
    /// Altitudes generated flight plans may file on `H` routes.
    pub spawnable_high: DirectionalAltitudes,
    /// Altitudes generated flight plans may file on TEC routes.
    pub spawnable_tec:  DirectionalAltitudes,
}

/// A pair of altitude lists, one per [`Direction`].
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DirectionalAltitudes {
    /// Altitudes for westbound flights.
    pub west: Vec<String>,
    /// Altitudes for eastbound flights.
    pub east: Vec<String>,
}

impl DirectionalAltitudes {
    /// Returns the list for a direction.
    #[must_use]
    pub fn get(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::West => &self.west,
            Direction::East => &self.east,
        }
    }
}

/// A family of aircraft sharing generation parameters.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct AircraftCategory {
    /// ICAO type designators.
    pub types:     Vec<String>,
    /// Filed true airspeed range in knots, `min..max`.
    pub speed:     SpeedRange,
    /// Equipment suffixes with their relative frequencies.
    pub equipment: WeightedList<String>,
    /// Display size of the aircraft on the diagram.
    pub size:      f32,
}

/// A half-open range of speeds in knots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SpeedRange {
    /// Inclusive lower bound.
    pub min: u32,
    /// Exclusive upper bound.
    pub max: u32,
}

/// An airline with its radio telephony.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Airline {
    /// Three-letter ICAO code, e.g. `AAL`.
    pub icao:      String,
    /// Radio telephony, e.g. `American`.
    pub telephony: String,
    /// Lower-case phrases speech recognition produces for the telephony,
    /// e.g. `american` or `care` for `Cair`.
    #[serde(default)]
    pub spoken:    Vec<String>,
}
