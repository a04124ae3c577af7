//! Project Configuration (ember.toml)
//!
//! Handles project-level configuration stored in `ember.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from ember.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// VM heap settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap: Option<HeapConfig>,

    /// Logging settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// VM heap configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeapConfig {
    /// Hard ceiling on live executable bytes (unbounded when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Allocation volume that triggers a collection before the next allocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc_threshold: Option<usize>,

    /// Collect before every allocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<bool>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive ("error", "warn", "info", "debug", "trace")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl ProjectConfig {
    /// Load project configuration from a file
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

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(heap) = &self.heap {
            heap.validate("heap")?;
        }
        if let Some(logging) = &self.logging {
            logging.validate("logging")?;
        }
        Ok(())
    }

    /// Merge another project config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        match (&mut self.heap, &other.heap) {
            (Some(heap), Some(theirs)) => heap.merge(theirs),
            (None, Some(theirs)) => self.heap = Some(theirs.clone()),
            _ => {}
        }
        if other.logging.is_some() {
            self.logging = other.logging.clone();
        }
    }
}

impl HeapConfig {
    pub(crate) fn validate(&self, section: &str) -> ConfigResult<()> {
        if self.limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.limit", section),
                reason: "limit must be greater than zero".to_string(),
            });
        }
        if let (Some(limit), Some(threshold)) = (self.limit, self.gc_threshold) {
            if threshold > limit {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.gc_threshold", section),
                    reason: format!("threshold {} exceeds heap limit {}", threshold, limit),
                });
            }
        }
        Ok(())
    }

    /// Field-wise merge; `other` wins where it is set
    pub fn merge(&mut self, other: &HeapConfig) {
        if other.limit.is_some() {
            self.limit = other.limit;
        }
        if other.gc_threshold.is_some() {
            self.gc_threshold = other.gc_threshold;
        }
        if other.stress.is_some() {
            self.stress = other.stress;
        }
    }
}

impl LoggingConfig {
    pub(crate) fn validate(&self, section: &str) -> ConfigResult<()> {
        if let Some(level) = &self.level {
            if !is_valid_level(level) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.level", section),
                    reason: format!(
                        "must be one of error, warn, info, debug, trace; got '{}'",
                        level
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Check if a log level name is valid
pub(crate) fn is_valid_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "error" | "warn" | "info" | "debug" | "trace"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_project_config() {
        let toml = r#"
[heap]
limit = 65536
gc_threshold = 4096
stress = true

[logging]
level = "debug"
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let heap = config.heap.as_ref().unwrap();
        assert_eq!(heap.limit, Some(65536));
        assert_eq!(heap.gc_threshold, Some(4096));
        assert_eq!(heap.stress, Some(true));
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_threshold_above_limit_rejected() {
        let config = ProjectConfig {
            heap: Some(HeapConfig {
                limit: Some(100),
                gc_threshold: Some(200),
                stress: None,
            }),
            logging: None,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "heap.gc_threshold"
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let heap = HeapConfig {
            limit: Some(0),
            ..Default::default()
        };
        assert!(heap.validate("heap").is_err());
    }

    #[test]
    fn test_merge_is_field_wise_for_heap() {
        let mut base = ProjectConfig {
            heap: Some(HeapConfig {
                limit: Some(1024),
                gc_threshold: Some(512),
                stress: None,
            }),
            logging: None,
        };
        let other = ProjectConfig {
            heap: Some(HeapConfig {
                limit: None,
                gc_threshold: Some(256),
                stress: Some(true),
            }),
            logging: Some(LoggingConfig {
                level: Some("trace".to_string()),
            }),
        };

        base.merge(&other);

        let heap = base.heap.unwrap();
        assert_eq!(heap.limit, Some(1024));
        assert_eq!(heap.gc_threshold, Some(256));
        assert_eq!(heap.stress, Some(true));
        assert_eq!(base.logging.unwrap().level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_level_names_are_case_insensitive() {
        assert!(is_valid_level("DEBUG"));
        assert!(!is_valid_level("verbose"));
    }
}
