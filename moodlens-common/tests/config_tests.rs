//! Config file loading and graceful degradation
//!
//! Uses serial_test: tests that touch MOODLENS_CONFIG run sequentially.

use moodlens_common::config::{load_toml_config, resolve_config_path, TomlConfig, CONFIG_ENV_VAR};
use moodlens_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let config = load_toml_config(Some(&missing)).expect("missing file must not be fatal");
    assert_eq!(config.port, TomlConfig::default().port);
}

#[test]
fn test_no_path_uses_defaults() {
    let config = load_toml_config(None).unwrap();
    assert_eq!(config.live, TomlConfig::default().live);
}

#[test]
fn test_full_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
port = 5800
classifier_url = "http://classifier:9000/analyze"
snapshot_url = "http://classifier:9000/snapshot"
frame_path = "/var/lib/moodlens/frames"
request_timeout_ms = 4000

[live]
base_interval_ms = 2400
adaptive = true
auto_apply = false
min_confidence = 0.7

[logging]
level = "debug"
"#
    )
    .unwrap();

    let config = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.port, 5800);
    assert_eq!(config.classifier_url, "http://classifier:9000/analyze");
    assert_eq!(config.snapshot_url, "http://classifier:9000/snapshot");
    assert_eq!(config.frame_path, Some(PathBuf::from("/var/lib/moodlens/frames")));
    assert_eq!(config.request_timeout_ms, 4000);
    assert_eq!(config.live.base_interval_ms, 2400);
    assert!(!config.live.auto_apply);
    assert!((config.live.min_confidence - 0.7).abs() < 1e-9);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    match load_toml_config(Some(file.path())) {
        Err(Error::Config(msg)) => assert!(msg.contains("Parse")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_unreadable_file_is_an_io_error() {
    // A directory exists but cannot be read as a file
    let dir = tempfile::tempdir().unwrap();

    match load_toml_config(Some(dir.path())) {
        Err(Error::Io(_)) => {}
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/etc/moodlens/from-env.toml");
    let path = resolve_config_path(None, CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(path, Some(PathBuf::from("/etc/moodlens/from-env.toml")));
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/etc/moodlens/from-env.toml");
    let cli = PathBuf::from("/opt/moodlens/cli.toml");
    let path = resolve_config_path(Some(&cli), CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(path, Some(cli));
}
