use serde::{Deserialize, Serialize};

/// A position on the airport diagram.
///
/// Units are arbitrary diagram units; the simulation thresholds
/// (node proximity, aircraft separation) are expressed in the same units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Point {
    /// Horizontal coordinate, increasing eastwards.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Constructs a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }
}
