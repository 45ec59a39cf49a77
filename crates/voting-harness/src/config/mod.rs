// crates/voting-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for voting platform harness runs.
// Purpose: Resolve service URLs, timeouts, and fixture policy once at start.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is resolved once per process: built-in defaults, then an
//! optional TOML file, then environment variables. The CLI applies its own
//! flags last. Every layer validates what it sets and fails closed.
//! Invariants:
//! - Service base URLs are absolute `http` or `https` URLs.
//! - Timeouts are strictly positive.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod file;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod file_tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_POLL_API;
pub use env::DEFAULT_TIMEOUT;
pub use env::DEFAULT_VOTE_API;
pub use env::DEFAULT_VOTER_API;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::NamespaceMode;
pub use env::ServiceEndpoints;
pub use env::VoteValueMode;
pub use env::parse_service_url;
pub use env::read_env_strict;
pub use file::ConfigFile;
