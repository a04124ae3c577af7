//! Configuration loading and precedence tests

use ember_config::loader::{DEFAULT_GC_THRESHOLD, DEFAULT_LOG_LEVEL, PROJECT_CONFIG_FILE};
use ember_config::{ConfigError, ConfigLoader};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join(PROJECT_CONFIG_FILE);
    fs::write(&config_path, content).unwrap();
    config_path
}

fn create_global_file(dir: &Path, content: &str) -> PathBuf {
    let global_path = dir.join("global.toml");
    fs::write(&global_path, content).unwrap();
    global_path
}

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
#[serial]
fn test_load_from_subdirectory_finds_parent() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[heap]
limit = 8192
"#,
    );

    let nested = temp_dir.path().join("src").join("builtins");
    fs::create_dir_all(&nested).unwrap();

    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let config = loader.load_from_directory(&nested).unwrap();

    assert_eq!(config.heap_limit(), Some(8192));
    assert_eq!(config.project_root(), Some(temp_dir.path()));
}

#[test]
#[serial]
fn test_load_from_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(
        temp_dir.path(),
        r#"
[logging]
level = "debug"
"#,
    );

    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let config = loader.load_from_file(&path).unwrap();

    assert_eq!(config.log_level(), "debug");
    assert_eq!(config.gc_threshold(), DEFAULT_GC_THRESHOLD);
}

#[test]
fn test_missing_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let result = loader.load_from_file(&temp_dir.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

// ============================================================================
// Precedence Tests
// ============================================================================

#[test]
#[serial]
fn test_project_overrides_global() {
    let temp_dir = TempDir::new().unwrap();
    let global = create_global_file(
        temp_dir.path(),
        r#"
[heap]
limit = 1000000
gc_threshold = 5000

[logging]
level = "info"
"#,
    );
    create_config_file(
        temp_dir.path(),
        r#"
[heap]
limit = 2000000
"#,
    );

    let mut loader = ConfigLoader::with_global_config_path(global);
    let config = loader.load_from_directory(temp_dir.path()).unwrap();

    assert_eq!(config.heap_limit(), Some(2000000));
    // Unset project fields fall through to the global file
    assert_eq!(config.gc_threshold(), 5000);
    assert_eq!(config.log_level(), "info");
}

#[test]
#[serial]
fn test_env_overrides_project() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[heap]
limit = 4096
gc_threshold = 1024

[logging]
level = "error"
"#,
    );

    env::set_var("EMBER_GC_THRESHOLD", "2048");
    env::set_var("EMBER_LOG", "trace");
    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let config = loader.load_from_directory(temp_dir.path());
    env::remove_var("EMBER_GC_THRESHOLD");
    env::remove_var("EMBER_LOG");

    let config = config.unwrap();
    assert_eq!(config.heap_limit(), Some(4096));
    assert_eq!(config.gc_threshold(), 2048);
    assert_eq!(config.log_level(), "trace");
}

#[test]
#[serial]
fn test_env_threshold_above_project_limit_rejected() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[heap]
limit = 4096
"#,
    );

    env::set_var("EMBER_GC_THRESHOLD", "8192");
    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let result = loader.load_from_directory(temp_dir.path());
    env::remove_var("EMBER_GC_THRESHOLD");

    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "heap.gc_threshold"
    ));
}

#[test]
#[serial]
fn test_defaults_without_any_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let config = loader.load_from_directory(temp_dir.path()).unwrap();

    assert_eq!(config.heap_limit(), None);
    assert_eq!(config.log_level(), DEFAULT_LOG_LEVEL);
    assert!(!config.gc_stress());
}

// ============================================================================
// Error Tests
// ============================================================================

#[rstest]
#[case("[heap\nlimit = 1", "Invalid TOML syntax")]
#[case("[heap]\nlimit = \"big\"", "Invalid TOML syntax")]
#[case("[package]\nname = \"x\"", "Invalid TOML syntax")]
#[case("[heap]\nlimit = 0", "heap.limit")]
#[case("[logging]\nlevel = \"chatty\"", "logging.level")]
#[serial]
fn test_invalid_project_config(#[case] content: &str, #[case] expected: &str) {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), content);

    let mut loader = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"));
    let err = loader.load_from_directory(temp_dir.path()).unwrap_err();

    assert!(
        err.to_string().contains(expected),
        "'{}' does not mention '{}'",
        err,
        expected
    );
}

#[test]
#[serial]
fn test_invalid_global_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let global = create_global_file(temp_dir.path(), "[heap]\nstress = \"sometimes\"");

    let mut loader = ConfigLoader::with_global_config_path(global.clone());
    let err = loader.load_from_directory(temp_dir.path()).unwrap_err();

    match err {
        ConfigError::TomlParseError { file, .. } => assert_eq!(file, global),
        other => panic!("expected TomlParseError, got {:?}", other),
    }
}
