use dg_core::{RoomTemplate, TilePools};
use serde::{Deserialize, Serialize};

/// A template referenced by name, with its draw weight in the random pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateWeight {
    pub template: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// A theme as written in a catalog file.
///
/// Rooms are referenced by template name so that several themes can share
/// one set of templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ThemeDefinition {
    pub name: String,
    /// Templates placed once, in order, before the random pool.
    #[serde(default)]
    pub mandatory: Vec<String>,
    /// Weighted random pool; single-door entries also serve as cap rooms.
    #[serde(default)]
    pub rooms: Vec<TemplateWeight>,
    #[serde(default)]
    pub tiles: TilePools,
    /// Prefab placed in front of doors that get no corridor.
    #[serde(default)]
    pub blocked_door: Option<String>,
}

impl ThemeDefinition {
    /// Every template name the theme refers to, mandatory first.
    pub fn referenced_templates(&self) -> impl Iterator<Item = &str> {
        self.mandatory
            .iter()
            .map(String::as_str)
            .chain(self.rooms.iter().map(|r| r.template.as_str()))
    }
}

/// The root structure of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AssetCatalog {
    #[serde(default)]
    pub templates: Vec<RoomTemplate>,
    #[serde(default)]
    pub themes: Vec<ThemeDefinition>,
}
