//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{is_valid_level, HeapConfig, LoggingConfig, ProjectConfig};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "ember.toml";

/// Collection threshold used when nothing is configured (1 MiB)
pub const DEFAULT_GC_THRESHOLD: usize = 1024 * 1024;

/// Log filter used when nothing is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.ember/config.toml) - lowest priority
/// 2. Project config (./ember.toml) - overrides global
/// 3. Environment variables (EMBER_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration (environment overrides already applied)
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where ember.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.ember/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ember.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration; a missing file or home directory yields defaults
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            match GlobalConfig::global_config_path() {
                Ok(path) => self.global_config_path = Some(path),
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            }
        }

        match &self.global_config_path {
            Some(path) if path.exists() => GlobalConfig::load_from_file(path),
            _ => Ok(GlobalConfig::default()),
        }
    }

    /// Apply environment variable overrides to project config
    ///
    /// Recognized variables: EMBER_HEAP_LIMIT, EMBER_GC_THRESHOLD,
    /// EMBER_GC_STRESS, EMBER_LOG.
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(limit) = env::var("EMBER_HEAP_LIMIT") {
            let limit = parse_bytes("EMBER_HEAP_LIMIT", &limit)?;
            config.heap.get_or_insert_with(HeapConfig::default).limit = Some(limit);
        }

        if let Ok(threshold) = env::var("EMBER_GC_THRESHOLD") {
            let threshold = parse_bytes("EMBER_GC_THRESHOLD", &threshold)?;
            config.heap.get_or_insert_with(HeapConfig::default).gc_threshold = Some(threshold);
        }

        if let Ok(stress) = env::var("EMBER_GC_STRESS") {
            let stress = matches!(stress.to_lowercase().as_str(), "true" | "1" | "yes");
            config.heap.get_or_insert_with(HeapConfig::default).stress = Some(stress);
        }

        if let Ok(level) = env::var("EMBER_LOG") {
            if !is_valid_level(&level) {
                return Err(ConfigError::InvalidValue {
                    field: "EMBER_LOG".to_string(),
                    reason: format!("unknown level '{}'", level),
                });
            }
            config.logging = Some(LoggingConfig { level: Some(level) });
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bytes(field: &str, raw: &str) -> ConfigResult<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a byte count, got '{}' ({})", raw, e),
        })
}

impl Config {
    /// Effective heap limit (project > global > unbounded)
    pub fn heap_limit(&self) -> Option<usize> {
        self.heap_setting(|heap| heap.limit)
    }

    /// Effective collection threshold (project > global > default)
    pub fn gc_threshold(&self) -> usize {
        self.heap_setting(|heap| heap.gc_threshold)
            .unwrap_or(DEFAULT_GC_THRESHOLD)
    }

    /// Whether stress collection is enabled
    pub fn gc_stress(&self) -> bool {
        self.heap_setting(|heap| heap.stress).unwrap_or(false)
    }

    /// Effective log filter (project > global > default)
    pub fn log_level(&self) -> &str {
        self.project
            .logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .or_else(|| self.global.logging.as_ref().and_then(|l| l.level.as_deref()))
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has ember.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    fn heap_setting<T>(&self, get: impl Fn(&HeapConfig) -> Option<T>) -> Option<T> {
        self.project
            .heap
            .as_ref()
            .and_then(&get)
            .or_else(|| self.global.heap.as_ref().and_then(&get))
    }
}
