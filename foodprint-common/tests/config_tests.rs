//! Unit tests for root folder resolution
//!
//! Priority order: CLI → FOODPRINT_ROOT_FOLDER → TOML → compiled default.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate FOODPRINT_ROOT_FOLDER are marked with #[serial].

use foodprint_common::config::{
    RootFolderInitializer, RootFolderResolver, TomlConfig, DATABASE_FILE_NAME, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins_over_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = RootFolderResolver::new("carbon-engine")
        .with_cli_arg(Some(PathBuf::from("/from/cli")))
        .with_toml_config(&toml)
        .resolve();

    assert_eq!(resolved, PathBuf::from("/from/cli"));
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_wins_over_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = RootFolderResolver::new("carbon-engine")
        .with_toml_config(&toml)
        .resolve();

    assert_eq!(resolved, PathBuf::from("/from/env"));
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_used_when_env_absent() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = RootFolderResolver::new("carbon-engine")
        .with_toml_config(&toml)
        .resolve();

    assert_eq!(resolved, PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_compiled_default_is_non_empty() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = RootFolderResolver::new("carbon-engine").resolve();

    assert!(!resolved.as_os_str().is_empty());
    assert!(resolved.to_string_lossy().contains("foodprint"));
}

#[test]
fn test_initializer_creates_directory_and_db_path() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("deep").join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join(DATABASE_FILE_NAME));
}
