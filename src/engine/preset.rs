//! Rule configuration and presets.

use super::registry::RuleRegistry;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Enable flag and parameter overrides for one rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetting {
    /// Whether the rule runs
    #[serde(default)]
    pub enabled: bool,

    /// Parameters merged over the rule's defaults
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl RuleSetting {
    /// An enabled rule with no overrides.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            parameters: Map::new(),
        }
    }

    /// An enabled rule with parameter overrides.
    pub fn with_parameters(parameters: Map<String, Value>) -> Self {
        Self {
            enabled: true,
            parameters,
        }
    }
}

/// Rule id to setting map consumed by the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConfig {
    settings: BTreeMap<String, RuleSetting>,
}

impl RuleConfig {
    /// Create an empty configuration (no rule enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable each of the given rules with default parameters.
    pub fn enabling<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::new();
        for id in ids {
            config.enable(id);
        }
        config
    }

    /// Enable a rule, keeping any parameters already set.
    pub fn enable(&mut self, id: impl Into<String>) -> &mut Self {
        self.settings.entry(id.into()).or_default().enabled = true;
        self
    }

    /// Disable a rule.
    pub fn disable(&mut self, id: impl Into<String>) -> &mut Self {
        self.settings.entry(id.into()).or_default().enabled = false;
        self
    }

    /// Set one parameter and enable the rule.
    pub fn set_param(
        &mut self,
        id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let setting = self.settings.entry(id.into()).or_default();
        setting.enabled = true;
        setting.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace the setting of a rule.
    pub fn insert(&mut self, id: impl Into<String>, setting: RuleSetting) -> &mut Self {
        self.settings.insert(id.into(), setting);
        self
    }

    /// Setting of a rule.
    pub fn get(&self, id: &str) -> Option<&RuleSetting> {
        self.settings.get(id)
    }

    /// Whether a rule is enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.settings.get(id).is_some_and(|s| s.enabled)
    }

    /// Ids of the enabled rules, sorted.
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.settings
            .iter()
            .filter(|(_, s)| s.enabled)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Iterate over all settings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSetting)> {
        self.settings.iter().map(|(id, s)| (id.as_str(), s))
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Whether there are no settings.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// A named, shareable bundle of rule settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Preset name
    pub name: String,

    /// What the preset is for
    #[serde(default)]
    pub description: String,

    /// Rule settings
    #[serde(default)]
    pub rules: RuleConfig,
}

impl Preset {
    /// Create an empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the rule settings.
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    /// A preset enabling every registered rule with its declared defaults.
    pub fn from_registry(registry: &RuleRegistry) -> Self {
        let mut rules = RuleConfig::new();
        for rule in registry.ordered() {
            rules.insert(rule.id(), RuleSetting::with_parameters(rule.default_params()));
        }
        Self::new("default")
            .with_description("Every built-in rule with its default parameters")
            .with_rules(rules)
    }

    /// Parse a preset from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let preset: Preset = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid preset: {}", e)))?;
        if preset.name.trim().is_empty() {
            return Err(Error::Config("preset name must not be empty".into()));
        }
        Ok(preset)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a preset from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write the preset to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Where the effective rule configuration comes from.
///
/// An explicit configuration wins over a preset; with neither, no rule runs.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Ad-hoc configuration
    pub explicit: Option<RuleConfig>,
    /// Named preset
    pub preset: Option<Preset>,
}

impl ConfigSource {
    /// No configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set an explicit configuration.
    pub fn with_config(mut self, config: RuleConfig) -> Self {
        self.explicit = Some(config);
        self
    }

    /// Builder: set a preset.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// The effective configuration.
    pub fn resolve(&self) -> RuleConfig {
        if let Some(config) = &self.explicit {
            return config.clone();
        }
        if let Some(preset) = &self.preset {
            log::debug!("Using preset '{}'", preset.name);
            return preset.rules.clone();
        }
        RuleConfig::new()
    }
}

impl From<RuleConfig> for ConfigSource {
    fn from(config: RuleConfig) -> Self {
        Self::new().with_config(config)
    }
}

impl From<Preset> for ConfigSource {
    fn from(preset: Preset) -> Self {
        Self::new().with_preset(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preset_json_shape() {
        let json = r#"{
            "name": "thesis",
            "description": "University thesis",
            "rules": {
                "font_standard": {"enabled": true, "parameters": {"font_size_body": 12}},
                "title_bold": {"enabled": false}
            }
        }"#;
        let preset = Preset::from_json(json).unwrap();
        assert_eq!(preset.name, "thesis");
        assert!(preset.rules.is_enabled("font_standard"));
        assert!(!preset.rules.is_enabled("title_bold"));
        assert!(!preset.rules.is_enabled("unknown"));
        assert_eq!(
            preset.rules.get("font_standard").unwrap().parameters["font_size_body"],
            json!(12)
        );

        let back = Preset::from_json(&preset.to_json().unwrap()).unwrap();
        assert_eq!(back, preset);
    }

    #[test]
    fn test_invalid_preset() {
        assert!(matches!(Preset::from_json("{"), Err(Error::Config(_))));
        assert!(matches!(
            Preset::from_json(r#"{"name": " "}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_resolution_order() {
        let preset = Preset::new("p").with_rules(RuleConfig::enabling(["a"]));
        let explicit = RuleConfig::enabling(["b"]);

        let source = ConfigSource::new().with_preset(preset.clone());
        assert_eq!(source.resolve().enabled_ids(), vec!["a"]);

        let source = source.with_config(explicit);
        assert_eq!(source.resolve().enabled_ids(), vec!["b"]);

        assert!(ConfigSource::new().resolve().is_empty());
    }

    #[test]
    fn test_set_param_enables() {
        let mut config = RuleConfig::new();
        config.set_param("image_resize", "max_width", 5.0).disable("title_bold");
        assert!(config.is_enabled("image_resize"));
        assert_eq!(config.enabled_ids(), vec!["image_resize"]);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        let preset = Preset::new("saved").with_rules(RuleConfig::enabling(["font_color"]));
        preset.save(&path).unwrap();
        assert_eq!(Preset::from_path(&path).unwrap(), preset);
    }
}
