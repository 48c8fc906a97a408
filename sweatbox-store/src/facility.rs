use serde::{Deserialize, Serialize};

/// Static information about the simulated ground position and its neighbours.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Facility {
    /// ICAO code of the airport, used as the departure field of flight plans.
    pub airport:             String,
    /// The radio name of the ground position, e.g. `Portland ground`.
    pub ground_name:         String,
    /// Station identifier of the ground position in the transcript log.
    pub ground_station:      String,
    /// Station identifier of the tower position in the transcript log.
    pub tower_station:       String,
    /// Current ATIS letter.
    pub atis:                char,
    /// The runway all departures taxi to.
    pub departure_runway:    String,
    /// Departure control frequency read out in clearances, e.g. `119.75`.
    pub departure_frequency: String,
    /// Tower frequency read out in handoffs, e.g. `120.9`.
    pub tower_frequency:     String,
    /// Where VFR aircraft call from, e.g. `north apron`.
    pub vfr_apron:           String,
    /// Altitude VFR departures are restricted to, in feet.
    pub vfr_altitude_limit:  u32,
    /// The mark expected in box 10 of a departure strip handed to tower.
    pub departure_strip_box: String,
    /// Taxi instruction for IFR aircraft whose parking spot does not define one.
    pub default_taxi:        TaxiInstruction,
    /// Taxi instruction for VFR aircraft departing from the apron.
    pub vfr_taxi:            TaxiInstruction,
}

/// A taxi instruction as displayed and as spoken.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TaxiInstruction {
    /// Text displayed in the transcript, e.g. `Runway 29, taxi via A, cross runway 36`.
    pub text:     String,
    /// Text passed to speech synthesis, with letters and digits spelled out.
    pub phonetic: String,
}
