use assert_fs::prelude::*;
use serde::Deserialize;
use sync_fs::{ConfigStore, Error};

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(default)]
struct TestConfig {
    name: String,
    count: i32,
}

#[test]
fn test_load_toml() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.toml");
    file.write_str("name = \"test\"\ncount = 42").unwrap();

    let config: TestConfig = ConfigStore::new().load(file.path()).unwrap();
    assert_eq!(config.name, "test");
    assert_eq!(config.count, 42);
}

#[test]
fn test_load_json() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(r#"{"name": "test", "count": 42}"#).unwrap();

    let config: TestConfig = ConfigStore::new().load(file.path()).unwrap();
    assert_eq!(config.count, 42);
}

#[test]
fn test_load_yaml() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.yml");
    file.write_str("name: test\ncount: 7").unwrap();

    let config: TestConfig = ConfigStore::new().load(file.path()).unwrap();
    assert_eq!(config.count, 7);
}

#[test]
fn test_unsupported_extension() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.ini");
    file.write_str("name=test").unwrap();

    let result: Result<TestConfig, _> = ConfigStore::new().load(file.path());
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}

#[test]
fn test_parse_error_names_format() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.toml");
    file.write_str("name = [unclosed").unwrap();

    let err = ConfigStore::new().load::<TestConfig>(file.path()).unwrap_err();
    assert!(err.to_string().contains("TOML"), "got: {err}");
}

#[test]
fn test_load_from_root_defaults_when_missing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config: TestConfig = ConfigStore::new().load_from_root(temp.path()).unwrap();
    assert_eq!(config, TestConfig::default());
}

#[test]
fn test_load_from_root_prefers_toml() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".tsync.toml").write_str("count = 1").unwrap();
    temp.child(".tsync.json").write_str(r#"{"count": 2}"#).unwrap();

    let config: TestConfig = ConfigStore::new().load_from_root(temp.path()).unwrap();
    assert_eq!(config.count, 1);
}
