use serde_json::json;

use crate::config::data::ConfigData;

fn sample() -> ConfigData {
    let serde_json::Value::Object(map) = json!({
        "database": { "host": "localhost", "port": 5432 },
        "packages": ["A", "B"],
        "debug": false
    }) else {
        unreachable!()
    };
    ConfigData::from_map(map)
}

#[test]
fn test_dotted_path_lookup() {
    let config = sample();
    assert_eq!(config.get::<String>("database.host").unwrap(), "localhost");
    assert_eq!(config.get::<u16>("database.port"), Some(5432));
    assert_eq!(config.get::<String>("packages.1").unwrap(), "B");
    assert_eq!(config.get::<bool>("debug"), Some(false));
}

#[test]
fn test_missing_or_mistyped_values_are_none() {
    let config = sample();
    assert_eq!(config.get::<String>("database.user"), None);
    assert_eq!(config.get::<String>("debug.nested"), None);
    assert_eq!(config.get::<u16>("database.host"), None);
    assert!(!config.contains("nope"));
    assert!(config.contains("database.port"));
}

#[test]
fn test_get_or_uses_default() {
    let config = sample();
    assert_eq!(config.get_or("database.user", "root".to_string()), "root");
    assert_eq!(config.get_or("database.port", 1u16), 5432);
}

#[test]
fn test_keys_and_value() {
    let config = sample();
    assert_eq!(config.keys(), vec!["database", "debug", "packages"]);
    assert_eq!(config.to_value()["database"]["port"], json!(5432));
}
