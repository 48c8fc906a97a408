//! Schema for reference data files.
//!
//! A reference data file describes one facility:
//! its taxiway graph, its parking spots,
//! the lookup tables used to generate and review flight plans,
//! and optionally a snapshot of the preferred-route database.

#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![forbid(missing_docs)]

use serde::{Deserialize, Serialize};

mod meta;
pub use meta::*;

mod facility;
pub use facility::*;

mod geometry;
pub use geometry::*;

mod taxiway;
pub use taxiway::*;

mod parking;
pub use parking::*;

mod tables;
pub use tables::*;

mod route;
pub use route::*;

mod weighted;
pub use weighted::*;

/// Root structure for a reference data file.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct File {
    /// Metadata about the file.
    pub meta:          Meta,
    /// Static information about the simulated facility.
    pub facility:      Facility,
    /// The taxiway graph aircraft follow to the departure runway.
    pub taxiway:       Taxiway,
    /// Parking spots new aircraft are spawned at.
    pub parking_spots: Vec<ParkingSpot>,
    /// Lookup tables for flight generation and review.
    pub tables:        Tables,

    /// Preferred routes departing from the facility.
    ///
    /// Usually empty in built-in files and supplied separately at startup.
    #[serde(default)]
    pub pref_routes: Vec<PrefRoute>,
}
