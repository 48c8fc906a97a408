use serde::{Deserialize, Serialize};

use crate::Point;

/// The taxiway graph.
///
/// Aircraft follow the first edge of the nearest node
/// until they reach the terminal node, so the graph is expected
/// to be laid out such that following first edges leads to the terminal.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Taxiway {
    /// All nodes in the graph.
    pub nodes:    Vec<TaxiwayNode>,
    /// ID of the node where aircraft are handed to tower.
    pub terminal: String,
}

/// A node in the taxiway graph.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TaxiwayNode {
    /// Unique identifier of the node.
    pub id:       String,
    /// Position of the node.
    pub position: Point,
    /// IDs of neighbouring nodes in order of preference.
    #[serde(default)]
    pub edges:    Vec<String>,
}
