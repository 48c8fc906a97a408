use serde::{Deserialize, Serialize};

/// An entry of the preferred-route database.
///
/// Field names follow the upstream JSON feed so that a downloaded list
/// deserializes directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PrefRoute {
    /// Departure airport without the `K` prefix.
    pub origin:      String,
    /// Destination airport without the `K` prefix.
    pub destination: String,
    /// Route category.
    #[serde(rename = "type")]
    pub kind:        PrefRouteType,
    /// Full route string including both endpoint identifiers, e.g. `PWM PSM V106 BOS`.
    pub route:       String,
    /// Sequence number within the origin/destination pair.
    #[serde(default)]
    pub seq:         u32,
    /// Altitude restriction text.
    #[serde(default)]
    pub altitude:    Option<String>,
    /// Aircraft restriction text.
    #[serde(default)]
    pub aircraft:    Option<String>,
    /// Area description.
    #[serde(default)]
    pub area:        Option<String>,
    /// Departure ARTCC.
    #[serde(default)]
    pub d_artcc:     Option<String>,
    /// Arrival ARTCC.
    #[serde(default)]
    pub a_artcc:     Option<String>,
    /// Traffic flow the route applies to.
    #[serde(default)]
    pub flow:        Option<String>,
    /// Effective hours, first window.
    #[serde(default)]
    pub hours1:      Option<String>,
    /// Effective hours, second window.
    #[serde(default)]
    pub hours2:      Option<String>,
    /// Effective hours, third window.
    #[serde(default)]
    pub hours3:      Option<String>,
}

/// FAA preferred route categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum PrefRouteType {
    /// Low altitude.
    L,
    /// High altitude.
    H,
    /// Low altitude single direction.
    #[serde(rename = "LSD")]
    Lsd,
    /// High altitude single direction.
    #[serde(rename = "HSD")]
    Hsd,
    /// Special low altitude directional.
    #[serde(rename = "SLD")]
    Sld,
    /// High altitude directional.
    #[serde(rename = "HLD")]
    Hld,
    /// Tower enroute control.
    #[serde(rename = "TEC")]
    Tec,
    /// Any category not listed above.
    #[serde(other)]
    Other,
}

impl PrefRoute {
    /// The route without its endpoint identifiers,
    /// in the form a controller files it in a flight plan.
    ///
    /// `PWM PSM V106 BOS` becomes `PSM V106`.
    #[must_use]
    pub fn filed_route(&self) -> String {
        let tokens: Vec<&str> = self.route.split_whitespace().collect();
        match tokens.len() {
            0..=2 => String::new(),
            len => tokens[1..len - 1].join(" "),
        }
    }

    /// The destination with the `K` prefix used in flight plans.
    #[must_use]
    pub fn icao_destination(&self) -> String { format!("K{}", self.destination) }
}
