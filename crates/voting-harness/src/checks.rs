// crates/voting-harness/src/checks.rs
// ============================================================================
// Module: Response Checks
// Description: Status, decoding, round-trip, and hypermedia assertions.
// Purpose: Turn raw responses into pass/fail verdicts with precise reasons.
// Dependencies: serde, voting-contract
// ============================================================================

//! ## Overview
//! Success is status 200 and nothing else. Absence and rejection are any
//! other status. Round-trip comparisons collect every differing field
//! instead of stopping at the first one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use serde::de::DeserializeOwned;
use voting_contract::Envelope;
use voting_contract::LinkRelation;
use voting_contract::Poll;
use voting_contract::Resource;
use voting_contract::Vote;
use voting_contract::Voter;

use crate::failure::FieldMismatch;
use crate::failure::ScenarioFailure;
use crate::requester::RawResponse;

// ============================================================================
// SECTION: Status Checks
// ============================================================================

/// Requires status 200.
///
/// # Errors
///
/// Returns [`ScenarioFailure::UnexpectedStatus`] for any other status.
pub fn expect_ok(action: &str, response: &RawResponse) -> Result<(), ScenarioFailure> {
    if response.is_ok() {
        return Ok(());
    }
    Err(ScenarioFailure::UnexpectedStatus {
        action: action.to_string(),
        status: response.status,
    })
}

/// Requires a refusal (any status other than 200).
///
/// # Errors
///
/// Returns [`ScenarioFailure::UnexpectedSuccess`] when the call succeeded.
pub fn expect_rejected(action: &str, response: &RawResponse) -> Result<(), ScenarioFailure> {
    if response.is_ok() {
        return Err(ScenarioFailure::UnexpectedSuccess {
            action: action.to_string(),
        });
    }
    Ok(())
}

/// Requires a read to observe absence (any status other than 200).
///
/// # Errors
///
/// Returns [`ScenarioFailure::StaleRead`] when the read succeeded.
pub fn expect_absent(action: &str, response: &RawResponse) -> Result<(), ScenarioFailure> {
    if response.is_ok() {
        return Err(ScenarioFailure::StaleRead {
            action: action.to_string(),
        });
    }
    Ok(())
}

/// Requires status 200 and decodes the body.
///
/// # Errors
///
/// Returns [`ScenarioFailure`] for a non-200 status or an undecodable body.
pub fn decode_ok<T: DeserializeOwned>(
    action: &str,
    response: &RawResponse,
) -> Result<T, ScenarioFailure> {
    expect_ok(action, response)?;
    response.json().map_err(|err| ScenarioFailure::Decode {
        action: action.to_string(),
        reason: err.to_string(),
    })
}

// ============================================================================
// SECTION: Hypermedia
// ============================================================================

/// Returns the href of `relation`, treating empty hrefs as missing.
///
/// # Errors
///
/// Returns [`ScenarioFailure::MissingLink`] when the relation is absent.
pub fn link_href<'a>(
    entity: &str,
    envelope: &'a Envelope,
    relation: LinkRelation,
) -> Result<&'a str, ScenarioFailure> {
    envelope.links.get(relation).map(|link| link.href.as_str()).ok_or_else(|| {
        ScenarioFailure::MissingLink {
            entity: entity.to_string(),
            relation: relation.as_str().to_string(),
        }
    })
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

/// Accumulates field mismatches.
#[derive(Debug, Default)]
pub struct FieldDiff {
    mismatches: Vec<FieldMismatch>,
}

impl FieldDiff {
    /// Compares one displayable field.
    pub fn field<T: PartialEq + Display + ?Sized>(&mut self, name: &str, expected: &T, actual: &T) {
        if expected != actual {
            self.push(name, expected.to_string(), actual.to_string());
        }
    }

    /// Compares one text field, quoting both sides.
    pub fn text(&mut self, name: &str, expected: &str, actual: &str) {
        if expected != actual {
            self.push(name, format!("\"{expected}\""), format!("\"{actual}\""));
        }
    }

    /// Returns `Ok` when nothing differed.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::ShapeMismatch`] listing every difference.
    pub fn finish(self, entity: String) -> Result<(), ScenarioFailure> {
        if self.mismatches.is_empty() {
            return Ok(());
        }
        Err(ScenarioFailure::ShapeMismatch {
            entity,
            mismatches: self.mismatches,
        })
    }

    fn push(&mut self, field: &str, expected: String, actual: String) {
        self.mismatches.push(FieldMismatch {
            field: field.to_string(),
            expected,
            actual,
        });
    }
}

/// Field-by-field comparison of a written resource against its read-back.
pub trait RoundTrip: Resource {
    /// Records every client-written field that differs.
    fn diff(&self, actual: &Self, diff: &mut FieldDiff);
}

impl RoundTrip for Voter {
    fn diff(&self, actual: &Self, diff: &mut FieldDiff) {
        diff.field("id", &self.id, &actual.id);
        diff.text("name", &self.name, &actual.name);
        diff.text("email", &self.email, &actual.email);
    }
}

impl RoundTrip for Poll {
    fn diff(&self, actual: &Self, diff: &mut FieldDiff) {
        diff.field("id", &self.id, &actual.id);
        diff.text("title", &self.title, &actual.title);
        diff.text("question", &self.question, &actual.question);
        diff.field("options.len", &self.options.len(), &actual.options.len());
        for (index, (expected, actual)) in self.options.iter().zip(&actual.options).enumerate() {
            diff.field(&format!("options[{index}].id"), &expected.id, &actual.id);
            diff.text(&format!("options[{index}].text"), &expected.text, &actual.text);
        }
    }
}

impl RoundTrip for Vote {
    fn diff(&self, actual: &Self, diff: &mut FieldDiff) {
        diff.field("id", &self.id, &actual.id);
        diff.field("pollId", &self.poll_id, &actual.poll_id);
        diff.field("voterId", &self.voter_id, &actual.voter_id);
        diff.field("voteValue", &self.vote_value, &actual.vote_value);
    }
}

/// Compares a written resource against what the service returned.
///
/// # Errors
///
/// Returns [`ScenarioFailure::ShapeMismatch`] listing every differing field.
pub fn verify_round_trip<R: RoundTrip>(expected: &R, actual: &R) -> Result<(), ScenarioFailure> {
    let mut diff = FieldDiff::default();
    expected.diff(actual, &mut diff);
    diff.finish(format!("{} {}", R::KIND.as_str(), expected.raw_id()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
