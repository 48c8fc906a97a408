use std::borrow::Cow;
use std::io;

use bevy::ecs::entity::Entity;
use bevy::ecs::query::With;
use bevy::ecs::system::Command as BevyCommand;
use bevy::ecs::world::World;
use store::PrefRoute;

use crate::sim::aircraft::Aircraft;
use crate::sim::clock::Clock;
use crate::sim::generate::VfrPool;
use crate::sim::mistake::MistakeLog;
use crate::sim::parking::Spots;
use crate::sim::radio::{Frequency, Log};
use crate::sim::reference::Reference;
use crate::sim::strip::Bays;
use crate::sim::taxi::Network;


pub enum Source {
    /// CBOR-encoded data file.
    Raw(Cow<'static, [u8]>),
    /// JSON-encoded data file.
    Json(Cow<'static, [u8]>),
    Parsed(Box<store::File>),
}

pub struct Command {
    pub source:   Source,
    /// Preferred routes supplied separately from the data file.
    pub routes:   Vec<PrefRoute>,
    pub on_error: Box<dyn FnOnce(&mut World, Error) + Send>,
}

impl BevyCommand for Command {
    fn apply(self, world: &mut World) {
        if let Err(err) = load(world, self.source, self.routes) {
            (self.on_error)(world, err);
        }
    }
}

/// Replaces the session with a new facility.
///
/// The world is left untouched if the data file is invalid.
pub fn load(world: &mut World, source: Source, routes: Vec<PrefRoute>) -> Result<()> {
    let mut file = match source {
        Source::Raw(bytes) => ciborium::from_reader(bytes.as_ref()).map_err(Error::Serde)?,
        Source::Json(bytes) => serde_json::from_slice(bytes.as_ref()).map_err(Error::Json)?,
        Source::Parsed(file) => *file,
    };
    file.pref_routes.extend(routes);

    validate(&file)?;
    let network = Network::from_store(&file.taxiway)?;
    let reference = Reference::from_file(&file);

    let unknown = reference.routes.unknown_destinations(&reference.tables);
    if !unknown.is_empty() {
        bevy::log::debug!(
            "{} preferred route destinations are missing from the destination table: {unknown:?}",
            unknown.len()
        );
    }
    bevy::log::info!(
        "Loaded {:?} with {} TEC and {} high altitude routes",
        file.meta.title,
        reference.routes.tec.len(),
        reference.routes.high.len(),
    );

    world
        .query_filtered::<Entity, With<Aircraft>>()
        .iter(world)
        .collect::<Vec<_>>()
        .into_iter()
        .for_each(|entity| world.entity_mut(entity).despawn());

    world.insert_resource(Spots::new(file.parking_spots));
    world.insert_resource(network);
    world.insert_resource(reference);
    world.insert_resource(Bays::default());
    world.insert_resource(MistakeLog::default());
    world.insert_resource(Log::default());
    world.insert_resource(Frequency::default());
    world.insert_resource(VfrPool::default());

    let paused = world.get_resource::<Clock>().is_some_and(|clock| clock.paused);
    let mut clock = Clock::default();
    clock.paused = paused;
    world.insert_resource(clock);

    Ok(())
}

fn validate(file: &store::File) -> Result<()> {
    let tables = &file.tables;
    for (name, types) in [
        ("jet aircraft types", &tables.jet.types),
        ("TEC aircraft types", &tables.tec.types),
        ("GA aircraft types", &tables.ga.types),
    ] {
        if types.is_empty() {
            return Err(Error::EmptyTable(name));
        }
    }
    if tables.airlines.is_empty() {
        return Err(Error::EmptyTable("airlines"));
    }
    if tables.vfr_destinations.is_empty() {
        return Err(Error::EmptyTable("VFR destinations"));
    }

    if file.parking_spots.is_empty() {
        return Err(Error::NoParkingSpots);
    }
    for spot in &file.parking_spots {
        let points = [spot.position, spot.pushback_location];
        if !spot.rotation.is_finite()
            || points.iter().any(|point| !point.x.is_finite() || !point.y.is_finite())
        {
            return Err(Error::NonFiniteFloat("parking spot geometry"));
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Deserialization error: {0}")]
    Serde(ciborium::de::Error<io::Error>),
    #[error("JSON deserialization error: {0}")]
    Json(serde_json::Error),
    #[error("Taxiway node {node:?} links to unknown node {edge:?}")]
    UnresolvedEdge { node: String, edge: String },
    #[error("No taxiway node called {0:?} to use as the terminal")]
    UnresolvedTerminal(String),
    #[error("Taxiway node {0:?} is declared twice")]
    DuplicateNode(String),
    #[error("The table of {0} is empty")]
    EmptyTable(&'static str),
    #[error("Non-finite value encountered at {0}")]
    NonFiniteFloat(&'static str),
    #[error("The facility has no parking spots")]
    NoParkingSpots,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
