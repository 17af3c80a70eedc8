//! Configuration for the icon resolver

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{IconResolverError, Result};
use crate::types::normalize_color;

/// Resolution options shared by the resolver and the facade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    // Rule sources
    /// Read icons from document frontmatter
    pub frontmatter_enabled: bool,
    /// Evaluate criteria-based frontmatter rules
    pub frontmatter_rules_enabled: bool,
    /// Let folders pass their inheritance icon to descendants
    pub inheritance_enabled: bool,

    // Colour handling
    /// Take the colour only from the source that supplied the icon
    pub couple_color_with_icon: bool,
    /// Colour applied when no source supplies one
    pub default_color: Option<String>,

    // Inline markers
    /// Delimiter around inline icon markers, e.g. `:LiBook:`
    pub icon_identifier: String,

    // Frontmatter fields
    pub frontmatter_icon_field: String,
    pub frontmatter_color_field: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            frontmatter_enabled: true,
            frontmatter_rules_enabled: true,
            inheritance_enabled: true,
            couple_color_with_icon: false,
            default_color: None,
            icon_identifier: ":".to_string(),
            frontmatter_icon_field: "icon".to_string(),
            frontmatter_color_field: "iconColor".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then the JSON file (if any), then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()
    }

    /// Parse a configuration from a JSON settings document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON settings file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loaded resolver settings from {:?}", path);
        Self::from_json_str(&contents)
    }

    /// Apply `ICON_RESOLVER_*` environment overrides
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(value) = env_flag("ICON_RESOLVER_INHERITANCE")? {
            self.inheritance_enabled = value;
        }
        if let Some(value) = env_flag("ICON_RESOLVER_FRONTMATTER")? {
            self.frontmatter_enabled = value;
        }
        if let Some(value) = env_flag("ICON_RESOLVER_COUPLE_COLOR")? {
            self.couple_color_with_icon = value;
        }
        if let Ok(color) = std::env::var("ICON_RESOLVER_DEFAULT_COLOR") {
            self.default_color = if color.trim().is_empty() { None } else { Some(color) };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.icon_identifier.is_empty() {
            return Err(IconResolverError::InvalidConfig(
                "icon identifier must not be empty".to_string(),
            ));
        }
        if self.frontmatter_icon_field.is_empty() {
            return Err(IconResolverError::InvalidConfig(
                "frontmatter icon field must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Default colour in its normalised form
    pub fn default_color(&self) -> Option<String> {
        self.default_color.as_deref().map(normalize_color)
    }

    pub fn with_inheritance(mut self, enabled: bool) -> Self {
        self.inheritance_enabled = enabled;
        self
    }

    pub fn with_frontmatter(mut self, enabled: bool) -> Self {
        self.frontmatter_enabled = enabled;
        self
    }

    pub fn with_frontmatter_rules(mut self, enabled: bool) -> Self {
        self.frontmatter_rules_enabled = enabled;
        self
    }

    /// Resolve colour together with the icon instead of independently
    pub fn with_coupled_color(mut self) -> Self {
        self.couple_color_with_icon = true;
        self
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = Some(color.into());
        self
    }

    pub fn with_icon_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.icon_identifier = identifier.into();
        self
    }

    /// Disable every optional rule source (useful for testing)
    pub fn without_optional_sources(mut self) -> Self {
        self.frontmatter_enabled = false;
        self.frontmatter_rules_enabled = false;
        self.inheritance_enabled = false;
        self
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(IconResolverError::InvalidConfig(format!(
                "{} must be a boolean, got '{}'",
                name, other
            ))),
        },
        Err(_) => Ok(None),
    }
}
