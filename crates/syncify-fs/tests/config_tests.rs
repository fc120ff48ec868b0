use serde::{Deserialize, Serialize};
use syncify_fs::{ConfigStore, NormalizedPath};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct TestConfig {
    name: String,
    count: i32,
}

#[test]
fn test_load_json() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.json");
    fs::write(&file_path, r#"{"name": "test", "count": 42}"#).unwrap();

    let config: TestConfig = ConfigStore::new()
        .load(&NormalizedPath::new(&file_path))
        .unwrap();

    assert_eq!(config.name, "test");
    assert_eq!(config.count, 42);
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.json"));

    let config: TestConfig = ConfigStore::new().load_or_default(&path).unwrap();
    assert_eq!(config, TestConfig::default());
}

#[test]
fn test_load_invalid_json_reports_path() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("broken.json");
    fs::write(&file_path, "{ not json").unwrap();

    let err = ConfigStore::new()
        .load::<TestConfig>(&NormalizedPath::new(&file_path))
        .unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_save_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("nested/config.json"));
    let store = ConfigStore::new();
    let value = TestConfig {
        name: "saved".into(),
        count: 7,
    };

    store.save(&path, &value).unwrap();
    let loaded: TestConfig = store.load(&path).unwrap();
    assert_eq!(loaded, value);
}
