use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::activity::DEFAULT_ACTIVITY_CAPACITY;
use crate::errors::ConfigError;
use crate::notify::DEFAULT_NOTIFICATION_CAPACITY;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// Entries kept by the activity log
    pub activity_log_capacity: usize,

    /// Undismissed notifications kept before the oldest is dropped
    pub notification_capacity: usize,

    /// Nesting limit for tree lookups and integrity checks
    pub max_tree_depth: usize,

    /// Custom templates file, relative to the config directory
    pub templates_path: String,

    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub pretty: bool,
    pub indent: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            max_tree_depth: pagecraft_model::MAX_TREE_DEPTH,
            templates_path: ".pagecraft/templates.json".to_string(),
            render: RenderSettings::default(),
        }
    }
}

impl BuilderConfig {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: BuilderConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(BuilderConfig::default())
        }
    }

    /// Write to `cwd`, returning the path written
    pub fn write(&self, cwd: &Path) -> Result<PathBuf, ConfigError> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);
        std::fs::write(&config_path, serde_json::to_string_pretty(self)?)?;
        Ok(config_path)
    }

    /// Get absolute path to the templates file
    pub fn get_templates_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.templates_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "activityLogCapacity": 10,
            "templatesPath": "tpl.json",
            "render": { "pretty": false }
        }"#;

        let config: BuilderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.activity_log_capacity, 10);
        assert_eq!(config.notification_capacity, 20);
        assert_eq!(config.templates_path, "tpl.json");
        assert!(!config.render.pretty);
        assert_eq!(config.render.indent, "  ");
    }

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert_eq!(config.activity_log_capacity, 100);
        assert_eq!(config.max_tree_depth, 64);
        assert_eq!(
            config.get_templates_path(Path::new("/site")),
            PathBuf::from("/site/.pagecraft/templates.json")
        );
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(BuilderConfig::load(dir.path()).unwrap(), BuilderConfig::default());

        let custom = BuilderConfig {
            notification_capacity: 5,
            ..Default::default()
        };
        custom.write(dir.path()).unwrap();
        assert_eq!(BuilderConfig::load(dir.path()).unwrap(), custom);
    }
}
