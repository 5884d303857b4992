use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use value_map::{ColorPair, ColorTable, GoboEntry, GoboTable};

mod value_map;

/// A fixture as described by the light server's snapshot payload.
///
/// Key spellings follow the wire format, which capitalizes keys coming from
/// the server config (`Name`, `Type`, `Functions`). Wire-only fields such as
/// DMX addressing are ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureDescriptor {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "Type")]
    pub type_name: Option<String>,
    #[serde(default, alias = "Functions")]
    pub functions: IndexMap<String, FunctionSpec>,
}

impl FixtureDescriptor {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::classify(&self.functions)
    }

    /// Transition-duration bounds declared for a function, if any.
    pub fn speed(&self, function: &str) -> Option<(f64, f64)> {
        self.functions.get(function).and_then(|f| f.speed)
    }
}

/// One controllable function (channel) of a fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Discrete value ranges for enumerated attributes like color or gobo,
    /// label -> [low, high] inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<IndexMap<String, (u8, u8)>>,
    /// `[min, max]` transition duration in seconds for speed-scaled axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<(f64, f64)>,
}

/// Semantic classes derived from a fixture's declared function set.
///
/// Computed once when a light entity is built; absent functions simply
/// yield `false`, there is no error case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Pan and tilt are both present.
    pub moving_head: bool,
    /// Red, green and blue channels are all present.
    pub rgb: bool,
    /// A `color` function with an enumerated value map.
    pub fixed_colors: bool,
    /// A `gobo` function is present (with or without a value map).
    pub gobo: bool,
}

impl Capabilities {
    pub fn classify(functions: &IndexMap<String, FunctionSpec>) -> Self {
        let has = |name: &str| functions.contains_key(name);
        Capabilities {
            moving_head: has("pan") && has("tilt"),
            rgb: has("red") && has("green") && has("blue"),
            fixed_colors: functions.get("color").is_some_and(|f| f.map.is_some()),
            gobo: has("gobo"),
        }
    }
}
