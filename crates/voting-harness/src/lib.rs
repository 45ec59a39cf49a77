// crates/voting-harness/src/lib.rs
// ============================================================================
// Module: Voting Harness Library
// Description: Integration-test engine for the Voters, Polls, and Votes services.
// Purpose: Sequence CRUD and link-following scenarios with ordered fixtures.
// Dependencies: reqwest, serde, thiserror, tokio, tracing, voting-contract
// ============================================================================

//! ## Overview
//! The harness proves a fixed set of cross-service contracts against a
//! running voting platform: id uniqueness, read-back fidelity, referential
//! integrity, non-cascading deletes, wholesale option replacement, and
//! link-driven result aggregation. Execution is a single ordered pipeline:
//! suites run in dependency order, steps inside a suite run strictly in
//! sequence, and fixtures are tracked in a per-run ledger so cleanup can
//! remove exactly what the run created.
//! Invariants:
//! - Only HTTP 200 counts as success; absence and rejection are any other status.
//! - Transport failures stop the run after the current suite's cleanup.
//! - Cleanup is best-effort and never changes a step verdict.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod checks;
pub mod config;
pub mod error;
pub mod failure;
pub mod fixtures;
pub mod harness;
pub mod pipeline;
pub mod platform;
pub mod readiness;
pub mod report;
pub mod requester;
pub mod suites;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::HarnessConfig;
pub use config::NamespaceMode;
pub use config::VoteValueMode;
pub use error::HarnessError;
pub use failure::ScenarioFailure;
pub use fixtures::FixtureLedger;
pub use fixtures::FixtureNamespace;
pub use harness::Harness;
pub use platform::Platform;
pub use platform::ResourceClient;
pub use report::RunReport;
pub use report::StepOutcome;
pub use report::write_artifacts;
pub use requester::HttpMethod;
pub use requester::RawResponse;
pub use requester::RequestError;
pub use requester::Requester;
pub use suites::SuiteId;
