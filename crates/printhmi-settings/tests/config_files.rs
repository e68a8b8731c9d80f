use printhmi_settings::{Config, SettingsError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::new();
    config.hmi.device = "/dev/ttyUSB0".to_string();
    config.moonraker.host = "printer.local".to_string();
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_file_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "hmi": { "baud": 9600 } }"#).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.hmi.baud, 9600);
    assert_eq!(loaded.hmi.ui, "openq1");
}

#[test]
fn test_save_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("printhmi").join("config.toml");
    Config::new().save_to_file(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[hmi]\nbaud = 0\n").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[hmi\nbaud = ").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Config(_))
    ));
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        Config::load(Some(&path)),
        Err(SettingsError::LoadError { .. })
    ));
}
