//! Global Configuration (~/.ember/config.toml)
//!
//! Handles user-level defaults stored in `~/.ember/config.toml`. Any value set
//! here is overridden by the project's `ember.toml`.

use crate::project::{HeapConfig, LoggingConfig};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.ember/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default heap settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap: Option<HeapConfig>,

    /// Default logging settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(heap) = &self.heap {
            heap.validate("heap")?;
        }
        if let Some(logging) = &self.logging {
            logging.validate("logging")?;
        }
        Ok(())
    }

    /// Get the global config file path (~/.ember/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ember").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_config() {
        let toml = r#"
[heap]
stress = false

[logging]
level = "warn"
"#;
        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.heap.unwrap().stress, Some(false));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let toml = r#"
[logging]
level = "loud"
"#;
        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let toml = r#"
[lsp]
hover = true
"#;
        assert!(toml::from_str::<GlobalConfig>(toml).is_err());
    }
}
