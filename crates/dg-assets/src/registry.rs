use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dg_core::{ConfigError, GeneratorConfig, RoomTemplate, Theme, WeightedTemplate};
use thiserror::Error;
use tracing::debug;

use crate::mapping::{AssetCatalog, ThemeDefinition};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Template {0:?} is defined more than once")]
    DuplicateTemplate(String),
    #[error("Theme {0:?} is defined more than once")]
    DuplicateTheme(String),
    #[error("Theme {theme:?} references unknown template {template:?}")]
    UnknownTemplate { theme: String, template: String },
    #[error("Theme not found: {0:?}")]
    UnknownTheme(String),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Templates and themes loaded from a catalog, checked for consistency.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    templates: BTreeMap<String, Arc<RoomTemplate>>,
    themes: BTreeMap<String, ThemeDefinition>,
}

impl ThemeRegistry {
    /// Build a registry from a catalog, validating every template and reference.
    pub fn new(catalog: AssetCatalog) -> Result<Self, RegistryError> {
        let mut templates = BTreeMap::new();
        for template in catalog.templates {
            template.validate()?;
            let name = template.name.clone();
            if templates.insert(name.clone(), Arc::new(template)).is_some() {
                return Err(RegistryError::DuplicateTemplate(name));
            }
        }

        let mut themes = BTreeMap::new();
        for theme in catalog.themes {
            if let Some(missing) = theme.referenced_templates().find(|t| !templates.contains_key(*t)) {
                return Err(RegistryError::UnknownTemplate {
                    theme: theme.name.clone(),
                    template: missing.to_string(),
                });
            }
            let name = theme.name.clone();
            if themes.insert(name.clone(), theme).is_some() {
                return Err(RegistryError::DuplicateTheme(name));
            }
        }

        debug!(templates = templates.len(), themes = themes.len(), "catalog loaded");
        Ok(Self { templates, themes })
    }

    /// Load the registry from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let catalog: AssetCatalog = serde_json::from_str(json)?;
        Self::new(catalog)
    }

    /// Load the registry from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn template(&self, name: &str) -> Option<&Arc<RoomTemplate>> {
        self.templates.get(name)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Resolve a theme definition into a [`Theme`] sharing the registry's templates.
    pub fn theme(&self, name: &str) -> Result<Theme, RegistryError> {
        let definition = self
            .themes
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTheme(name.to_string()))?;
        let lookup = |template: &str| {
            self.templates
                .get(template)
                .map(Arc::clone)
                .ok_or_else(|| RegistryError::UnknownTemplate {
                    theme: definition.name.clone(),
                    template: template.to_string(),
                })
        };

        let mandatory = definition
            .mandatory
            .iter()
            .map(|t| lookup(t.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let rooms = definition
            .rooms
            .iter()
            .map(|r| {
                Ok(WeightedTemplate {
                    template: lookup(r.template.as_str())?,
                    weight: r.weight,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Ok(Theme {
            name: definition.name.clone(),
            mandatory,
            rooms,
            tiles: definition.tiles.clone(),
            blocked_door: definition.blocked_door.clone(),
        })
    }
}

/// Load generator settings from a JSON file; absent fields keep their defaults.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<GeneratorConfig, RegistryError> {
    let content = std::fs::read_to_string(path)?;
    let config: GeneratorConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
