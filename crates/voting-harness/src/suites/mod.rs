// crates/voting-harness/src/suites/mod.rs
// ============================================================================
// Module: Suites
// Description: The four contract suites and their shared lifecycle helpers.
// Purpose: Express each suite as a declared plan over typed resources.
// Dependencies: voting-contract
// ============================================================================

//! ## Overview
//! Suites run in dependency order: Voter, Poll, Vote, Integrated. Helpers
//! here implement the lifecycle moves every suite shares (create and mark
//! live, read back, reject, delete and release, confirm absence) so the
//! suite modules read as their scenario lists.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod integrated;
pub mod poll;
pub mod vote;
pub mod voter;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use voting_contract::OptionId;
use voting_contract::Poll;
use voting_contract::PollId;
use voting_contract::PollOption;
use voting_contract::PollResults;
use voting_contract::Resource;
use voting_contract::Voter;
use voting_contract::VoterId;

use crate::checks;
use crate::checks::RoundTrip;
use crate::config::VoteValueMode;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::pipeline::RunContext;

pub use integrated::IntegratedSuite;
pub use poll::PollSuite;
pub use vote::VoteSuite;
pub use voter::VoterSuite;

// ============================================================================
// SECTION: Suite Ids
// ============================================================================

/// Identifier of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteId {
    /// Voter lifecycle.
    Voter,
    /// Poll lifecycle and option replacement.
    Poll,
    /// Vote lifecycle and referential integrity.
    Vote,
    /// Cross-service hypermedia navigation.
    Integrated,
}

impl SuiteId {
    /// Every suite, in dependency order.
    pub const ALL: [Self; 4] = [Self::Voter, Self::Poll, Self::Vote, Self::Integrated];

    /// Returns the suite label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voter => "voter",
            Self::Poll => "poll",
            Self::Vote => "vote",
            Self::Integrated => "integrated",
        }
    }
}

impl fmt::Display for SuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| format!("unknown suite \"{raw}\""))
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Voter payload used for every voter fixture.
#[must_use]
pub fn voter_payload(id: u64) -> Voter {
    Voter::new(VoterId::new(id), "Test", "")
}

/// Two-option poll payload used for every poll fixture.
#[must_use]
pub fn poll_payload(id: u64) -> Poll {
    Poll::new(
        PollId::new(id),
        "Test",
        "Test",
        vec![PollOption::new(OptionId::new(1), "Test"), PollOption::new(OptionId::new(2), "Test")],
    )
}

/// Vote value selecting the option at `index` of `poll`.
#[must_use]
pub fn vote_value_for(mode: VoteValueMode, poll: &Poll, index: usize) -> u64 {
    match mode {
        VoteValueMode::OptionId => poll.options.get(index).map_or(0, |option| option.id.get()),
        VoteValueMode::OptionIndex => u64::try_from(index).unwrap_or(u64::MAX),
    }
}

/// Count recorded for the option selected by `vote_value`.
#[must_use]
pub fn count_selected(mode: VoteValueMode, results: &PollResults, vote_value: u64) -> Option<u64> {
    match mode {
        VoteValueMode::OptionId => results.count_for(OptionId::new(vote_value)),
        VoteValueMode::OptionIndex => {
            usize::try_from(vote_value).ok().and_then(|index| results.count_at(index))
        }
    }
}

/// Human description of the option selected by `vote_value`.
#[must_use]
pub fn selector_label(mode: VoteValueMode, vote_value: u64) -> String {
    match mode {
        VoteValueMode::OptionId => format!("option id {vote_value}"),
        VoteValueMode::OptionIndex => format!("option index {vote_value}"),
    }
}

// ============================================================================
// SECTION: Lifecycle Helpers
// ============================================================================

/// POSTs `resource`, requires 200, and marks `key` live.
///
/// # Errors
///
/// Returns [`ScenarioFailure`] on transport failure or a non-200 status.
pub async fn create_live<R: Resource>(
    ctx: &mut RunContext<'_>,
    key: FixtureKey,
    resource: &R,
) -> Result<(), ScenarioFailure> {
    let action = format!("create {} {}", R::KIND.as_str(), resource.raw_id());
    let response = ctx.platform().client(R::KIND).create(resource).await?;
    checks::expect_ok(&action, &response)?;
    ctx.ledger_mut().mark_live(key);
    Ok(())
}

/// GETs `{base}/{id}` and decodes a 200 body.
///
/// # Errors
///
/// Returns [`ScenarioFailure`] on transport failure, non-200, or decode failure.
pub async fn read_resource<R: Resource>(
    ctx: &RunContext<'_>,
    id: u64,
) -> Result<R, ScenarioFailure> {
    let action = format!("read {} {id}", R::KIND.as_str());
    let response = ctx.platform().client(R::KIND).read(id).await?;
    checks::decode_ok(&action, &response)
}

/// Reads `expected` back and compares every written field.
///
/// # Errors
///
/// Returns [`ScenarioFailure`] when the read fails or any field differs.
pub async fn verify_stored<R: RoundTrip>(
    ctx: &RunContext<'_>,
    expected: &R,
) -> Result<R, ScenarioFailure> {
    let actual: R = read_resource(ctx, expected.raw_id()).await?;
    checks::verify_round_trip(expected, &actual)?;
    Ok(actual)
}

/// POSTs `resource` and requires a refusal. If the service accepts it anyway,
/// `key` is marked live so cleanup removes the stray entity.
///
/// # Errors
///
/// Returns [`ScenarioFailure::UnexpectedSuccess`] when the POST succeeds.
pub async fn create_rejected<R: Resource>(
    ctx: &mut RunContext<'_>,
    key: FixtureKey,
    resource: &R,
    action: &str,
) -> Result<(), ScenarioFailure> {
    let response = ctx.platform().client(R::KIND).create(resource).await?;
    if response.is_ok() {
        ctx.ledger_mut().mark_live(key);
    }
    checks::expect_rejected(action, &response)
}

/// DELETEs the entity behind `key`, requires 200, and releases `key`.
///
/// # Errors
///
/// Returns [`ScenarioFailure`] on transport failure or a non-200 status.
pub async fn delete_released(
    ctx: &mut RunContext<'_>,
    key: FixtureKey,
) -> Result<(), ScenarioFailure> {
    let id = ctx.id(key)?;
    let action = format!("delete {} {id}", key.kind.as_str());
    let response = ctx.platform().client(key.kind).delete(id).await?;
    checks::expect_ok(&action, &response)?;
    ctx.ledger_mut().mark_released(key);
    Ok(())
}

/// GETs the entity behind `key` and requires it to be gone.
///
/// # Errors
///
/// Returns [`ScenarioFailure::StaleRead`] when the read still succeeds.
pub async fn expect_gone(ctx: &mut RunContext<'_>, key: FixtureKey) -> Result<(), ScenarioFailure> {
    let id = ctx.id(key)?;
    let action = format!("read deleted {} {id}", key.kind.as_str());
    let response = ctx.platform().client(key.kind).read(id).await?;
    checks::expect_absent(&action, &response)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
