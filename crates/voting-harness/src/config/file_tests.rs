// crates/voting-harness/src/config/file_tests.rs
// ============================================================================
// Module: Harness Config File Unit Tests
// Description: Unit coverage for the TOML configuration layer.
// Purpose: Ensure file values are validated and applied over defaults.
// Dependencies: toml
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::path::PathBuf;
use std::time::Duration;

use super::ConfigError;
use super::ConfigFile;
use super::HarnessConfig;
use super::NamespaceMode;
use super::VoteValueMode;
use crate::fixtures::MAX_NAMESPACE_BASE;

#[test]
fn file_values_override_defaults() {
    let raw = r#"
[services]
polls = "http://127.0.0.1:9082/polls"
votes = "http://127.0.0.1:9080/votes"

[run]
timeout_sec = 5
namespace = 900
vote_value = "option-id"
ready_timeout_sec = 2
artifacts_dir = "target/runs"
"#;
    let file = ConfigFile::parse(raw, "inline").expect("parse");
    let mut config = HarnessConfig::defaults().expect("defaults");
    file.apply(&mut config).expect("apply");

    assert_eq!(config.endpoints.polls.as_str(), "http://127.0.0.1:9082/polls");
    assert_eq!(config.endpoints.voters.as_str(), "http://localhost:1081/voters");
    assert_eq!(config.endpoints.votes.as_str(), "http://127.0.0.1:9080/votes");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.namespace, NamespaceMode::Explicit(900));
    assert_eq!(config.vote_value, VoteValueMode::OptionId);
    assert_eq!(config.ready_timeout, Some(Duration::from_secs(2)));
    assert_eq!(config.run_root, Some(PathBuf::from("target/runs")));
}

#[test]
fn file_accepts_named_namespace() {
    let file = ConfigFile::parse("[run]\nnamespace = \"fixed\"\n", "inline").expect("parse");
    let mut config = HarnessConfig::defaults().expect("defaults");
    file.apply(&mut config).expect("apply");
    assert_eq!(config.namespace, NamespaceMode::Fixed);
}

#[test]
fn empty_file_keeps_defaults() {
    let file = ConfigFile::parse("", "inline").expect("parse");
    let mut config = HarnessConfig::defaults().expect("defaults");
    file.apply(&mut config).expect("apply");
    assert_eq!(config, HarnessConfig::defaults().expect("defaults"));
}

#[test]
fn unknown_key_is_rejected() {
    let err = ConfigFile::parse("[run]\nretries = 3\n", "harness.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "harness.toml"));
}

#[test]
fn invalid_values_name_the_file_key() {
    let file = ConfigFile::parse("[run]\ntimeout_sec = 0\n", "inline").expect("parse");
    let mut config = HarnessConfig::defaults().expect("defaults");
    let err = file.apply(&mut config).unwrap_err();
    assert_eq!(err.to_string(), "run.timeout_sec must be greater than zero");

    let file = ConfigFile::parse("[run]\nvote_value = \"option-name\"\n", "inline").expect("parse");
    let err = file.apply(&mut config).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidVoteValue {
            name: "run.vote_value".to_string(),
            value: "option-name".to_string(),
        }
    );

    let file =
        ConfigFile::parse("[services]\nvoters = \"localhost:1081\"\n", "inline").expect("parse");
    let err = file.apply(&mut config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { ref name, .. } if name == "services.voters"));
}

#[test]
fn read_reports_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = ConfigFile::read(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn file_rejects_namespace_base_beyond_id_range() {
    let raw = format!("[run]\nnamespace = {}\n", MAX_NAMESPACE_BASE + 1);
    let file = ConfigFile::parse(&raw, "inline").expect("parse");
    let mut config = HarnessConfig::defaults().expect("defaults");
    let err = file.apply(&mut config).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidNamespace {
            name: "run.namespace".to_string(),
            value: (MAX_NAMESPACE_BASE + 1).to_string(),
        }
    );
}
