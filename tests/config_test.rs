/*!
 * Integration tests for client configuration files
 *
 * These tests write real TOML files and check how they load, validate and
 * turn into a session driver.
 */

use std::path::PathBuf;
use tempfile::TempDir;
use tether::{build_driver, ClientConfig, LogLevel, TetherError};
use tokio_test::{assert_err, assert_ok};

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("tether.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        endpoints = ["alpha:50051", "beta:50052", "[::1]:50053"]
        instance_id = "worker-3"
        seed = 7
        pacing_interval_ms = 500
        initial_grace_ms = 1500
        backoff_ms = 200
        hint_unit_ms = 100
        connect_timeout_ms = 2000
        call_timeout_ms = 3000
        log_level = "trace"
        verbose = false
        "#,
    );

    let config = ClientConfig::from_file(&path).unwrap();
    assert_ok!(config.validate());

    assert_eq!(config.endpoint_pool().unwrap().len(), 3);
    assert_eq!(config.instance_id.as_deref(), Some("worker-3"));
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.log_level, LogLevel::Trace);

    let driver_config = config.to_driver_config();
    assert_eq!(driver_config.pacing_interval.as_millis(), 500);
    assert_eq!(driver_config.initial_grace.as_millis(), 1500);
    assert_eq!(driver_config.backoff.as_millis(), 200);
    assert_eq!(driver_config.hint_offset(3).as_millis(), 300);
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");

    let config = ClientConfig {
        endpoints: vec!["localhost:6000".to_string()],
        seed: Some(99),
        backoff_ms: 50,
        ..Default::default()
    };
    config.to_file(&path).unwrap();

    let reloaded = ClientConfig::from_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = ClientConfig::from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(TetherError::Io(_))));
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "endpoints = 12");

    let err = assert_err!(ClientConfig::from_file(&path));
    assert!(matches!(err, TetherError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_zero_backoff_refuses_to_build() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "backoff_ms = 0");

    let config = ClientConfig::from_file(&path).unwrap();
    match build_driver(&config) {
        Err(err) => assert_eq!(err.exit_code(), 2),
        Ok(_) => panic!("zero backoff must be rejected"),
    }
}

#[test]
fn test_seeded_config_builds() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "endpoints = [\"localhost:50051\"]\nseed = 1");

    let config = ClientConfig::from_file(&path).unwrap();
    assert!(build_driver(&config).is_ok());
}

#[test]
fn test_endpoints_unusable_as_uri_fail_at_startup() {
    let dir = TempDir::new().unwrap();

    for bad in ["local host:50051", "::1:50051", "a/b:50051"] {
        let path = write_config(&dir, &format!("endpoints = [\"localhost:50051\", \"{}\"]", bad));
        let config = ClientConfig::from_file(&path).unwrap();

        let err = assert_err!(config.validate());
        assert!(matches!(err, TetherError::Connect(_)), "{}: {:?}", bad, err);
        assert!(build_driver(&config).is_err(), "{} must not build a driver", bad);
    }
}
