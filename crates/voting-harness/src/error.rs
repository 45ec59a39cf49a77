// crates/voting-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Errors that prevent a run from starting or being recorded.
// Purpose: Separate operator-facing setup failures from step failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Step failures live in the run report. [`HarnessError`] covers everything
//! outside it: bad configuration, an unbuildable HTTP client, a platform
//! that never became ready, and artifacts that could not be written.

use thiserror::Error;

use crate::config::ConfigError;
use crate::requester::RequestError;

/// Harness setup and artifact errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// HTTP client could not be created.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// A service did not answer its health check in time.
    #[error("{service} service not ready after {attempts} attempts: {last}")]
    NotReady {
        /// Collection of the service checked.
        service: String,
        /// Health check attempts made.
        attempts: u32,
        /// Last observed status or transport error.
        last: String,
    },
    /// Artifacts could not be written.
    #[error("failed to write artifacts at {path}: {reason}")]
    Artifacts {
        /// Path being written.
        path: String,
        /// Failure.
        reason: String,
    },
}
