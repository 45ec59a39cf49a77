// crates/voting-harness/src/failure.rs
// ============================================================================
// Module: Scenario Failures
// Description: Failure taxonomy for harness steps.
// Purpose: Give every way a step can fail a distinct, reportable variant.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A step either passes or returns one [`ScenarioFailure`]. Every failure
//! aborts the rest of its suite; [`ScenarioFailure::is_fatal`] failures also
//! stop the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::requester::RequestError;

// ============================================================================
// SECTION: Field Mismatches
// ============================================================================

/// One field that read back differently from what was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    /// Field path, e.g. `options[1].text`.
    pub field: String,
    /// Written value.
    pub expected: String,
    /// Read-back value.
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.field, self.expected, self.actual)
    }
}

fn join_mismatches(mismatches: &[FieldMismatch]) -> String {
    mismatches.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Reason a step failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScenarioFailure {
    /// Expected-success call returned another status.
    #[error("{action}: expected status 200, got {status}")]
    UnexpectedStatus {
        /// What was attempted.
        action: String,
        /// Returned status.
        status: u16,
    },
    /// Expected-rejection call succeeded.
    #[error("{action}: expected rejection, got status 200")]
    UnexpectedSuccess {
        /// What was attempted.
        action: String,
    },
    /// Read after delete still succeeded.
    #[error("{action}: expected absence after delete, got status 200")]
    StaleRead {
        /// What was attempted.
        action: String,
    },
    /// Successful response whose fields differ from what was expected.
    #[error("{entity} mismatch: {}", join_mismatches(.mismatches))]
    ShapeMismatch {
        /// Entity compared, e.g. `poll 4`.
        entity: String,
        /// Every differing field.
        mismatches: Vec<FieldMismatch>,
    },
    /// Response lacks a usable hypermedia relation.
    #[error("{entity} has no usable {relation} link")]
    MissingLink {
        /// Entity inspected.
        entity: String,
        /// Missing relation name.
        relation: String,
    },
    /// Results body lacks the selected option.
    #[error("results of poll {poll} have no entry for {selector}")]
    MissingResult {
        /// Poll id.
        poll: u64,
        /// Option selector description.
        selector: String,
    },
    /// Aggregate did not move by the expected amount.
    #[error("results of poll {poll} for {selector} went from {before} to {after}, expected {expected}")]
    CountDelta {
        /// Poll id.
        poll: u64,
        /// Option selector description.
        selector: String,
        /// Count before the extra vote.
        before: u64,
        /// Count after the extra vote.
        after: u64,
        /// Expected count after the extra vote.
        expected: u64,
    },
    /// Successful response body did not decode.
    #[error("{action}: undecodable response body: {reason}")]
    Decode {
        /// What was attempted.
        action: String,
        /// Decoder failure.
        reason: String,
    },
    /// Transport or dispatch failure.
    #[error(transparent)]
    Transport(#[from] RequestError),
    /// A required fixture was not live when the step started.
    #[error("fixture {key} must be live before the step, but is {state}")]
    PreconditionUnmet {
        /// Fixture key.
        key: String,
        /// Observed state.
        state: String,
    },
    /// The run namespace has no id left for a fixture.
    #[error("fixture {key} has no id in namespace {base}")]
    NamespaceExhausted {
        /// Fixture key.
        key: String,
        /// Namespace base.
        base: u64,
    },
    /// A fixture did not end the step in its declared state.
    #[error("fixture {key} should be {expected} after the step, but is {actual}")]
    FixtureBookkeeping {
        /// Fixture key.
        key: String,
        /// Declared state.
        expected: String,
        /// Observed state.
        actual: String,
    },
}

impl ScenarioFailure {
    /// Returns true when the failure stops the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
