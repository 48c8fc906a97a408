use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Descriptive information about a reference data file.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Meta {
    /// An identifier for this file, to remain consistent over versions.
    pub id:          String,
    /// Human-readable title.
    pub title:       String,
    /// Longer description of the scenario.
    pub description: String,
    /// Authors of the data.
    pub authors:     Vec<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags:        HashMap<String, String>,
}
