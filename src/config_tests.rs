#![allow(clippy::unwrap_used)]

use std::fs;

use super::*;

fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn test_defaults_without_file_or_env() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::load_from(&dir.path().join("config.toml"), dir.path(), env(&[])).unwrap();
    assert_eq!(cfg.app_id, "my-expense-app-v1");
    assert_eq!(cfg.log, "warn");
    assert_eq!(cfg.data_dir, dir.path());
    assert_eq!(cfg.db_path(), dir.path().join("gastos.db"));
}

#[test]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    fs::write(&file, "app_id = \"casa\"\nlog = \"gastos=debug\"\n").unwrap();
    let cfg = Config::load_from(&file, dir.path(), env(&[])).unwrap();
    assert_eq!(cfg.app_id, "casa");
    assert_eq!(cfg.log, "gastos=debug");
}

#[test]
fn test_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    fs::write(&file, "app_id = \"casa\"\n").unwrap();
    let cfg = Config::load_from(
        &file,
        dir.path(),
        env(&[
            ("GASTOS_APP_ID", "oficina"),
            ("GASTOS_DATA_DIR", "/tmp/gastos-test"),
            ("GASTOS_LOG", "info"),
        ]),
    )
    .unwrap();
    assert_eq!(cfg.app_id, "oficina");
    assert_eq!(cfg.data_dir, PathBuf::from("/tmp/gastos-test"));
    assert_eq!(cfg.log, "info");
}

#[test]
fn test_rejects_app_id_with_slash() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(
        &dir.path().join("config.toml"),
        dir.path(),
        env(&[("GASTOS_APP_ID", "a/b")]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid app id"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    fs::write(&file, "app_id = [").unwrap();
    assert!(Config::load_from(&file, dir.path(), env(&[])).is_err());
}
