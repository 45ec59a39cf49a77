// crates/voting-harness/src/config/file.rs
// ============================================================================
// Module: Harness Config File
// Description: Optional TOML configuration layer.
// Purpose: Let operators pin service URLs and run policy in a checked-in file.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! The file has two tables, `[services]` and `[run]`; every key is optional
//! and unknown keys are rejected. Values pass through the same validators as
//! the environment layer, with the file key named in any error.
//!
//! ```toml
//! [services]
//! polls = "http://localhost:1082/polls"
//!
//! [run]
//! timeout_sec = 10
//! namespace = "per-run"
//! vote_value = "option-id"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use super::env::ConfigError;
use super::env::HarnessConfig;
use super::env::parse_namespace;
use super::env::parse_service_url;
use super::env::parse_timeout_seconds;
use super::env::parse_vote_value;

// ============================================================================
// SECTION: File Schema
// ============================================================================

/// Parsed harness config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Service base URLs.
    #[serde(default)]
    pub services: ServicesSection,
    /// Run policy.
    #[serde(default)]
    pub run: RunSection,
}

/// `[services]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesSection {
    /// Polls service base URL.
    pub polls: Option<String>,
    /// Voters service base URL.
    pub voters: Option<String>,
    /// Votes service base URL.
    pub votes: Option<String>,
}

/// `[run]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Per-call timeout in seconds.
    pub timeout_sec: Option<u64>,
    /// Namespace mode name or numeric base.
    pub namespace: Option<NamespaceSetting>,
    /// `option-id` or `option-index`.
    pub vote_value: Option<String>,
    /// Readiness wait in seconds.
    pub ready_timeout_sec: Option<u64>,
    /// Artifact root directory.
    pub artifacts_dir: Option<PathBuf>,
}

/// Namespace written either as a mode name or a bare integer base.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NamespaceSetting {
    /// Numeric base.
    Base(u64),
    /// `fixed` or `per-run`.
    Name(String),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ConfigFile {
    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable or not valid for the schema.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::ReadFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// Parses config text; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid for the schema.
    pub fn parse(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse {
            path: origin.to_string(),
            reason: err.to_string(),
        })
    }

    /// Applies the file's values on top of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value fails validation.
    pub fn apply(&self, config: &mut HarnessConfig) -> Result<(), ConfigError> {
        if let Some(raw) = &self.services.polls {
            config.endpoints.polls = parse_service_url("services.polls", raw)?;
        }
        if let Some(raw) = &self.services.voters {
            config.endpoints.voters = parse_service_url("services.voters", raw)?;
        }
        if let Some(raw) = &self.services.votes {
            config.endpoints.votes = parse_service_url("services.votes", raw)?;
        }
        if let Some(secs) = self.run.timeout_sec {
            config.timeout = parse_timeout_seconds("run.timeout_sec", &secs.to_string())?;
        }
        match &self.run.namespace {
            Some(NamespaceSetting::Base(base)) => {
                config.namespace = parse_namespace("run.namespace", &base.to_string())?;
            }
            Some(NamespaceSetting::Name(name)) => {
                config.namespace = parse_namespace("run.namespace", name)?;
            }
            None => {}
        }
        if let Some(raw) = &self.run.vote_value {
            config.vote_value = parse_vote_value("run.vote_value", raw)?;
        }
        if let Some(secs) = self.run.ready_timeout_sec {
            config.ready_timeout =
                Some(parse_timeout_seconds("run.ready_timeout_sec", &secs.to_string())?);
        }
        if let Some(dir) = &self.run.artifacts_dir {
            config.run_root = Some(dir.clone());
        }
        Ok(())
    }
}
