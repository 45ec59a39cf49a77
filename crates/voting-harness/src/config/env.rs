// crates/voting-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Typed harness configuration and its environment overrides.
// Purpose: Centralize env parsing with strict UTF-8 and value validation.
// Dependencies: serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! The three service base URLs come from `POLL_API`, `VOTER_API`, and
//! `VOTE_API`, falling back to the local defaults. Harness-specific knobs use
//! the `VOTING_HARNESS_` prefix. Invalid UTF-8 or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;
use voting_contract::ResourceKind;

use crate::fixtures::MAX_NAMESPACE_BASE;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default Polls service base URL.
pub const DEFAULT_POLL_API: &str = "http://localhost:1082/polls";
/// Default Voters service base URL.
pub const DEFAULT_VOTER_API: &str = "http://localhost:1081/voters";
/// Default Votes service base URL.
pub const DEFAULT_VOTE_API: &str = "http://localhost:1080/votes";
/// Default per-call HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Polls service base URL.
    PollApi,
    /// Voters service base URL.
    VoterApi,
    /// Votes service base URL.
    VoteApi,
    /// Per-call timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Fixture namespace (`fixed`, `per-run`, or a numeric base).
    Namespace,
    /// Artifact root directory.
    RunRoot,
    /// Readiness wait in seconds (positive integer).
    ReadyTimeoutSeconds,
}

impl HarnessEnv {
    /// Every key, in resolution order.
    pub const ALL: [Self; 7] = [
        Self::PollApi,
        Self::VoterApi,
        Self::VoteApi,
        Self::TimeoutSeconds,
        Self::Namespace,
        Self::RunRoot,
        Self::ReadyTimeoutSeconds,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PollApi => "POLL_API",
            Self::VoterApi => "VOTER_API",
            Self::VoteApi => "VOTE_API",
            Self::TimeoutSeconds => "VOTING_HARNESS_TIMEOUT_SEC",
            Self::Namespace => "VOTING_HARNESS_NAMESPACE",
            Self::RunRoot => "VOTING_HARNESS_RUN_ROOT",
            Self::ReadyTimeoutSeconds => "VOTING_HARNESS_READY_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - `name` always identifies the setting (env var, file key, or flag).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment value is not valid UTF-8.
    #[error("{name} must be valid UTF-8")]
    InvalidUtf8 {
        /// Setting name.
        name: String,
    },
    /// Value is set but empty.
    #[error("{name} must not be empty")]
    Empty {
        /// Setting name.
        name: String,
    },
    /// Value is not an absolute http(s) URL.
    #[error("{name} must be an absolute http(s) url, got \"{value}\": {reason}")]
    InvalidUrl {
        /// Setting name.
        name: String,
        /// Rejected value.
        value: String,
        /// Parse or scheme failure.
        reason: String,
    },
    /// Value is not a positive number of seconds.
    #[error("{name} {reason}")]
    InvalidTimeout {
        /// Setting name.
        name: String,
        /// Validation failure.
        reason: String,
    },
    /// Unknown namespace mode.
    #[error(
        "{name} must be fixed, per-run, or an integer base of at most {MAX_NAMESPACE_BASE}, got \"{value}\""
    )]
    InvalidNamespace {
        /// Setting name.
        name: String,
        /// Rejected value.
        value: String,
    },
    /// Unknown vote value mode.
    #[error("{name} must be option-id or option-index, got \"{value}\"")]
    InvalidVoteValue {
        /// Setting name.
        name: String,
        /// Rejected value.
        value: String,
    },
    /// Config file could not be read.
    #[error("failed to read config file {path}: {reason}")]
    ReadFile {
        /// File path.
        path: String,
        /// I/O failure.
        reason: String,
    },
    /// Config file is not valid TOML for the harness schema.
    #[error("invalid config file {path}: {reason}")]
    Parse {
        /// File path.
        path: String,
        /// Parse failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// How fixture ids are namespaced for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceMode {
    /// Ids start at 1 per resource kind; runs are not isolated from each other.
    Fixed,
    /// Base derived from the wall clock at run start.
    #[default]
    PerRun,
    /// Operator-chosen base, at most [`MAX_NAMESPACE_BASE`].
    Explicit(u64),
}

impl FromStr for NamespaceMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("fixed") {
            return Ok(Self::Fixed);
        }
        if trimmed.eq_ignore_ascii_case("per-run") {
            return Ok(Self::PerRun);
        }
        match trimmed.parse::<u64>() {
            Ok(base) if base <= MAX_NAMESPACE_BASE => Ok(Self::Explicit(base)),
            _ => Err(trimmed.to_string()),
        }
    }
}

impl fmt::Display for NamespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.write_str("fixed"),
            Self::PerRun => f.write_str("per-run"),
            Self::Explicit(base) => base.fmt(f),
        }
    }
}

/// How a vote's `voteValue` maps onto the poll's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteValueMode {
    /// `voteValue` is the selected option's id.
    OptionId,
    /// `voteValue` is the zero-based position of the selected option, as the
    /// Votes service counts it.
    #[default]
    OptionIndex,
}

impl FromStr for VoteValueMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "option-id" => Ok(Self::OptionId),
            "option-index" => Ok(Self::OptionIndex),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for VoteValueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OptionId => f.write_str("option-id"),
            Self::OptionIndex => f.write_str("option-index"),
        }
    }
}

/// Base URLs of the three services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Voters service base URL.
    pub voters: Url,
    /// Polls service base URL.
    pub polls: Url,
    /// Votes service base URL.
    pub votes: Url,
}

impl ServiceEndpoints {
    /// Returns the local default endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a built-in default fails to parse.
    pub fn local_defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            voters: parse_service_url(HarnessEnv::VoterApi.as_str(), DEFAULT_VOTER_API)?,
            polls: parse_service_url(HarnessEnv::PollApi.as_str(), DEFAULT_POLL_API)?,
            votes: parse_service_url(HarnessEnv::VoteApi.as_str(), DEFAULT_VOTE_API)?,
        })
    }

    /// Returns the base URL serving `kind`.
    #[must_use]
    pub const fn for_kind(&self, kind: ResourceKind) -> &Url {
        match kind {
            ResourceKind::Voter => &self.voters,
            ResourceKind::Poll => &self.polls,
            ResourceKind::Vote => &self.votes,
        }
    }
}

/// Fully resolved harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Service base URLs.
    pub endpoints: ServiceEndpoints,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
    /// Fixture id namespace policy.
    pub namespace: NamespaceMode,
    /// Vote value interpretation for result counting.
    pub vote_value: VoteValueMode,
    /// Readiness wait; the health check is skipped when `None`.
    pub ready_timeout: Option<Duration>,
    /// Artifact root; no artifacts are written when `None`.
    pub run_root: Option<PathBuf>,
}

impl HarnessConfig {
    /// Returns the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a built-in default fails to parse.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoints: ServiceEndpoints::local_defaults()?,
            timeout: DEFAULT_TIMEOUT,
            namespace: NamespaceMode::default(),
            vote_value: VoteValueMode::default(),
            ready_timeout: None,
            run_root: None,
        })
    }

    /// Loads defaults, then the optional TOML file, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or any environment value is invalid.
    pub fn load(file: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults()?;
        if let Some(path) = file {
            super::file::ConfigFile::read(path)?.apply(&mut config)?;
        }
        config.apply_env()?;
        Ok(config)
    }

    /// Applies environment overrides on top of the current values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8, is
    /// empty, or fails validation.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env_nonempty(HarnessEnv::PollApi.as_str())? {
            self.endpoints.polls = parse_service_url(HarnessEnv::PollApi.as_str(), &value)?;
        }
        if let Some(value) = read_env_nonempty(HarnessEnv::VoterApi.as_str())? {
            self.endpoints.voters = parse_service_url(HarnessEnv::VoterApi.as_str(), &value)?;
        }
        if let Some(value) = read_env_nonempty(HarnessEnv::VoteApi.as_str())? {
            self.endpoints.votes = parse_service_url(HarnessEnv::VoteApi.as_str(), &value)?;
        }
        if let Some(value) = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())? {
            self.timeout = parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value)?;
        }
        if let Some(value) = read_env_nonempty(HarnessEnv::Namespace.as_str())? {
            self.namespace = parse_namespace(HarnessEnv::Namespace.as_str(), &value)?;
        }
        if let Some(value) = read_env_nonempty(HarnessEnv::RunRoot.as_str())? {
            self.run_root = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env_nonempty(HarnessEnv::ReadyTimeoutSeconds.as_str())? {
            self.ready_timeout =
                Some(parse_timeout_seconds(HarnessEnv::ReadyTimeoutSeconds.as_str(), &value)?);
        }
        Ok(())
    }

    /// Returns a JSON view of the resolved configuration for display.
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({
            "services": {
                "voters": self.endpoints.voters.as_str(),
                "polls": self.endpoints.polls.as_str(),
                "votes": self.endpoints.votes.as_str(),
            },
            "run": {
                "timeout_sec": self.timeout.as_secs(),
                "namespace": self.namespace.to_string(),
                "vote_value": self.vote_value.to_string(),
                "ready_timeout_sec": self.ready_timeout.map(|timeout| timeout.as_secs()),
                "artifacts_dir": self.run_root.as_ref().map(|path| path.display().to_string()),
            },
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8 {
            name: name.to_string(),
        })
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty {
            name: name.to_string(),
        }),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a service base URL and requires an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] for unparsable or non-http(s) values.
pub fn parse_service_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name: name.to_string(),
        value: trimmed.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(invalid(format!("unsupported scheme {scheme}"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Parses a positive timeout value in whole seconds.
pub(crate) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidTimeout {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("must be a positive integer number of seconds"));
    }
    let secs: u64 =
        trimmed.parse().map_err(|_| invalid("must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a namespace mode.
pub(crate) fn parse_namespace(name: &str, raw: &str) -> Result<NamespaceMode, ConfigError> {
    raw.parse().map_err(|value| ConfigError::InvalidNamespace {
        name: name.to_string(),
        value,
    })
}

/// Parses a vote value mode.
pub(crate) fn parse_vote_value(name: &str, raw: &str) -> Result<VoteValueMode, ConfigError> {
    raw.parse().map_err(|value| ConfigError::InvalidVoteValue {
        name: name.to_string(),
        value,
    })
}
