use serde::{Deserialize, Serialize};

use crate::{Point, TaxiInstruction};

/// A place where aircraft are spawned.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ParkingSpot {
    /// Unique identifier of the spot.
    pub id:                 String,
    /// What kind of traffic parks here.
    pub kind:               SpotKind,
    /// Initial aircraft position.
    pub position:           Point,
    /// Initial aircraft heading in degrees.
    pub rotation:           f32,
    /// The name aircraft use to describe where they are, e.g. a gate number.
    pub location:           String,
    /// Whether pushback ends in the ramp (at pilot discretion)
    /// instead of onto a taxiway (requires approval).
    #[serde(default)]
    pub pushback_into_ramp: bool,
    /// Where pushback stops.
    pub pushback_location:  Point,
    /// ICAO code of the airline operating from this spot.
    #[serde(default)]
    pub airline:            Option<String>,
    /// Fixed taxi instruction for aircraft departing from this spot.
    #[serde(default)]
    pub taxi_instruction:   Option<TaxiInstruction>,
}

/// Category of a parking spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum SpotKind {
    /// Airline gate. Jets with an IFR clearance, pushback and taxi.
    Airline,
    /// General aviation apron. VFR departures and pattern work.
    Ga,
    /// Turboprops flying tower enroute control routes.
    Tec,
}
