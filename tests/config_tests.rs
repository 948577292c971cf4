use serial_test::serial;
use std::env;
use tempfile::tempdir;

use chaoscatcher::config::{Config, PathSource};
use chaoscatcher::errors::AppError;

const VARS: [&str; 2] = ["HOME", "CHAOSCATCHER_DATA"];

fn save_env() -> Vec<(&'static str, Option<String>)> {
    VARS.iter().map(|v| (*v, env::var(v).ok())).collect()
}

fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
    for (name, value) in saved {
        match value {
            Some(val) => env::set_var(name, val),
            None => env::remove_var(name),
        }
    }
}

#[test]
#[serial]
fn test_config_precedence_through_environment() {
    let saved = save_env();
    let home = tempdir().unwrap();
    let env_path = home.path().join("from-env.json");
    env::set_var("HOME", home.path());
    env::set_var("CHAOSCATCHER_DATA", &env_path);

    let config = Config::load(None, None, false).unwrap();
    assert_eq!(config.data_path, env_path);
    assert_eq!(config.source, PathSource::Environment);

    let config = Config::load(None, Some("work"), false).unwrap();
    assert_eq!(
        config.data_path,
        home.path().join(".config/chaoscatcher/work.json")
    );

    let explicit = home.path().join("explicit.json");
    let config = Config::load(explicit.to_str(), None, false).unwrap();
    assert_eq!(config.data_path, explicit);
    assert_eq!(config.source, PathSource::Explicit);

    restore_env(saved);
}

#[test]
#[serial]
fn test_config_tilde_expansion() {
    let saved = save_env();
    let home = tempdir().unwrap();
    env::set_var("HOME", home.path());
    env::remove_var("CHAOSCATCHER_DATA");

    let config = Config::load(Some("~/journal/data.json"), None, false).unwrap();
    assert_eq!(config.data_path, home.path().join("journal/data.json"));
    assert!(config.validate().is_ok());

    restore_env(saved);
}

#[test]
#[serial]
fn test_config_missing_home_needs_explicit_path() {
    let saved = save_env();
    env::remove_var("HOME");
    env::remove_var("CHAOSCATCHER_DATA");

    match Config::load(None, None, false) {
        Err(AppError::Config(msg)) => assert!(msg.contains("HOME is not set")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    let dir = tempdir().unwrap();
    let explicit = dir.path().join("data.json");
    assert!(Config::load(explicit.to_str(), None, false).is_ok());

    restore_env(saved);
}

#[test]
#[serial]
fn test_store_carries_override_flag() {
    let saved = save_env();
    let home = tempdir().unwrap();
    env::set_var("HOME", home.path());
    env::remove_var("CHAOSCATCHER_DATA");

    let config = Config::load(None, Some("dev"), true).unwrap();
    let store = config.store();
    assert_eq!(store.path(), config.data_path.as_path());

    restore_env(saved);
}
