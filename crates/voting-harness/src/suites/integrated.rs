// crates/voting-harness/src/suites/integrated.rs
// ============================================================================
// Module: Integrated Suite
// Description: Cross-service scenarios driven by hypermedia links.
// Purpose: Prove votes advertise working links and results aggregate exactly.
// Dependencies: voting-contract
// ============================================================================

//! ## Overview
//! Every cross-service hop follows a link read from a response; no results
//! or voter URL is built by hand. Scenarios:
//! - `vote_links_to_results`: the vote's `results` link resolves.
//! - `results_count_increments`: a second voter's vote on the same option
//!   moves that option's count by exactly one. Its extra voter and vote are
//!   deleted before the scenario returns.
//! - `vote_links_to_voter`: the vote's `voter` link resolves to its voter.
//! - `delete_does_not_cascade`: deleting a vote's poll and voter leaves the
//!   vote readable.
//!
//! Invariants:
//! - Cleanup deletes the voter, the poll, then the primary vote, then any
//!   scenario-local leftovers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use voting_contract::LinkRelation;
use voting_contract::PollResults;
use voting_contract::ResourceKind;
use voting_contract::Vote;
use voting_contract::VoteId;
use voting_contract::Voter;
use voting_contract::VoterId;

use super::SuiteId;
use super::count_selected;
use super::create_live;
use super::delete_released;
use super::poll_payload;
use super::read_resource;
use super::selector_label;
use super::verify_stored;
use super::vote_value_for;
use super::voter_payload;
use crate::checks;
use crate::checks::FieldDiff;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::pipeline::Phase;
use crate::pipeline::RunContext;
use crate::pipeline::StepSpec;
use crate::pipeline::Suite;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Voter casting the primary vote.
pub const VOTER: FixtureKey = FixtureKey::new(ResourceKind::Voter, "integrated.voter");
/// Poll every vote of the suite is cast in.
pub const POLL: FixtureKey = FixtureKey::new(ResourceKind::Poll, "integrated.poll");
/// Vote whose links are followed.
pub const VOTE: FixtureKey = FixtureKey::new(ResourceKind::Vote, "integrated.vote");
/// Second voter of `results_count_increments`.
pub const SECOND_VOTER: FixtureKey =
    FixtureKey::new(ResourceKind::Voter, "integrated.second_voter");
/// Second vote of `results_count_increments`.
pub const SECOND_VOTE: FixtureKey = FixtureKey::new(ResourceKind::Vote, "integrated.second_vote");
/// Voter deleted out from under `ORPHAN_VOTE`.
pub const ORPHAN_VOTER: FixtureKey =
    FixtureKey::new(ResourceKind::Voter, "integrated.orphan_voter");
/// Poll deleted out from under `ORPHAN_VOTE`.
pub const ORPHAN_POLL: FixtureKey = FixtureKey::new(ResourceKind::Poll, "integrated.orphan_poll");
/// Vote that must survive deletion of its poll and voter.
pub const ORPHAN_VOTE: FixtureKey = FixtureKey::new(ResourceKind::Vote, "integrated.orphan_vote");

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Steps of the integrated suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratedStep {
    /// Create the voter fixture.
    ProvisionVoter,
    /// Create the poll fixture.
    ProvisionPoll,
    /// Cast the primary vote and follow its `results` link.
    VoteLinksToResults,
    /// Cast a second vote on the same option and compare aggregates.
    ResultsCountIncrements,
    /// Follow the primary vote's `voter` link.
    VoteLinksToVoter,
    /// Delete a vote's poll and voter; the vote must remain.
    DeleteDoesNotCascade,
}

const PLAN: &[StepSpec<IntegratedStep>] = &[
    StepSpec {
        id: IntegratedStep::ProvisionVoter,
        name: "provision_voter",
        phase: Phase::Startup,
        requires: &[],
        provides: &[VOTER],
        releases: &[],
    },
    StepSpec {
        id: IntegratedStep::ProvisionPoll,
        name: "provision_poll",
        phase: Phase::Startup,
        requires: &[],
        provides: &[POLL],
        releases: &[],
    },
    StepSpec {
        id: IntegratedStep::VoteLinksToResults,
        name: "vote_links_to_results",
        phase: Phase::Scenario,
        requires: &[VOTER, POLL],
        provides: &[VOTE],
        releases: &[],
    },
    StepSpec {
        id: IntegratedStep::ResultsCountIncrements,
        name: "results_count_increments",
        phase: Phase::Scenario,
        requires: &[VOTER, POLL, VOTE],
        provides: &[],
        releases: &[],
    },
    StepSpec {
        id: IntegratedStep::VoteLinksToVoter,
        name: "vote_links_to_voter",
        phase: Phase::Scenario,
        requires: &[VOTE],
        provides: &[],
        releases: &[],
    },
    StepSpec {
        id: IntegratedStep::DeleteDoesNotCascade,
        name: "delete_does_not_cascade",
        phase: Phase::Scenario,
        requires: &[],
        provides: &[ORPHAN_VOTE],
        releases: &[ORPHAN_POLL, ORPHAN_VOTER],
    },
];

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Cross-service suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegratedSuite;

impl IntegratedSuite {
    /// Builds vote `key` for `voter` in `poll`, selecting the first option.
    fn vote(
        ctx: &mut RunContext<'_>,
        key: FixtureKey,
        voter: FixtureKey,
        poll: FixtureKey,
    ) -> Result<Vote, ScenarioFailure> {
        let poll = poll_payload(ctx.id(poll)?);
        let value = vote_value_for(ctx.vote_value(), &poll, 0);
        Ok(Vote::new(VoteId::new(ctx.id(key)?), poll.id, VoterId::new(ctx.id(voter)?), value))
    }

    /// Reads `vote_id`, follows its `results` link, and decodes the body.
    async fn results_via_vote(
        ctx: &RunContext<'_>,
        vote_id: u64,
    ) -> Result<(Vote, PollResults), ScenarioFailure> {
        let vote: Vote = read_resource(ctx, vote_id).await?;
        let entity = format!("vote {vote_id}");
        let href = checks::link_href(&entity, &vote.envelope, LinkRelation::Results)?;
        let response = ctx.platform().votes().follow(href).await?;
        let results = checks::decode_ok(&format!("follow results link of {entity}"), &response)?;
        Ok((vote, results))
    }

    async fn vote_links_to_results(ctx: &mut RunContext<'_>) -> Result<(), ScenarioFailure> {
        let vote = Self::vote(ctx, VOTE, VOTER, POLL)?;
        create_live(ctx, VOTE, &vote).await?;
        verify_stored(ctx, &vote).await?;
        Self::results_via_vote(ctx, vote.id.get()).await.map(drop)
    }

    async fn results_count_increments(ctx: &mut RunContext<'_>) -> Result<(), ScenarioFailure> {
        let mode = ctx.vote_value();
        let vote_id = ctx.id(VOTE)?;
        let (primary, before) = Self::results_via_vote(ctx, vote_id).await?;
        let selector = selector_label(mode, primary.vote_value);
        let poll = primary.poll_id.get();
        let missing = || ScenarioFailure::MissingResult {
            poll,
            selector: selector.clone(),
        };
        let before = count_selected(mode, &before, primary.vote_value).ok_or_else(missing)?;

        let observed = Self::second_vote_results(ctx, primary.vote_value).await;
        Self::local_teardown(ctx).await;

        let after = observed?;
        let after = count_selected(mode, &after, primary.vote_value).ok_or_else(missing)?;
        let expected = before.saturating_add(1);
        if after != expected {
            return Err(ScenarioFailure::CountDelta {
                poll,
                selector,
                before,
                after,
                expected,
            });
        }
        Ok(())
    }

    /// Casts the second voter's vote for `vote_value` and re-reads the results
    /// through the primary vote's link.
    async fn second_vote_results(
        ctx: &mut RunContext<'_>,
        vote_value: u64,
    ) -> Result<PollResults, ScenarioFailure> {
        let voter = voter_payload(ctx.id(SECOND_VOTER)?);
        create_live(ctx, SECOND_VOTER, &voter).await?;
        let mut second = Self::vote(ctx, SECOND_VOTE, SECOND_VOTER, POLL)?;
        second.vote_value = vote_value;
        create_live(ctx, SECOND_VOTE, &second).await?;
        let vote_id = ctx.id(VOTE)?;
        Self::results_via_vote(ctx, vote_id).await.map(|(_, results)| results)
    }

    /// Deletes the second vote and voter; failures are left to suite cleanup.
    async fn local_teardown(ctx: &mut RunContext<'_>) {
        for key in [SECOND_VOTE, SECOND_VOTER] {
            if !ctx.ledger().is_live(key) {
                continue;
            }
            if let Err(failure) = delete_released(ctx, key).await {
                tracing::warn!(fixture = %key, error = %failure, "scenario teardown failed");
            }
        }
    }

    async fn vote_links_to_voter(ctx: &mut RunContext<'_>) -> Result<(), ScenarioFailure> {
        let vote_id = ctx.id(VOTE)?;
        let vote: Vote = read_resource(ctx, vote_id).await?;
        let entity = format!("vote {vote_id}");
        let href = checks::link_href(&entity, &vote.envelope, LinkRelation::Voter)?;
        let response = ctx.platform().votes().follow(href).await?;
        let voter: Voter = checks::decode_ok(&format!("follow voter link of {entity}"), &response)?;
        let mut diff = FieldDiff::default();
        diff.field("id", &vote.voter_id, &voter.id);
        diff.finish(format!("voter linked from {entity}"))
    }

    async fn delete_does_not_cascade(ctx: &mut RunContext<'_>) -> Result<(), ScenarioFailure> {
        let voter = voter_payload(ctx.id(ORPHAN_VOTER)?);
        create_live(ctx, ORPHAN_VOTER, &voter).await?;
        let poll = poll_payload(ctx.id(ORPHAN_POLL)?);
        create_live(ctx, ORPHAN_POLL, &poll).await?;
        let vote = Self::vote(ctx, ORPHAN_VOTE, ORPHAN_VOTER, ORPHAN_POLL)?;
        create_live(ctx, ORPHAN_VOTE, &vote).await?;

        delete_released(ctx, ORPHAN_POLL).await?;
        delete_released(ctx, ORPHAN_VOTER).await?;

        let action = format!("read vote {} after deleting its poll and voter", vote.id);
        let response = ctx.platform().votes().read(vote.id.get()).await?;
        checks::expect_ok(&action, &response)
    }
}

impl Suite for IntegratedSuite {
    type Step = IntegratedStep;

    const ID: SuiteId = SuiteId::Integrated;

    fn plan(&self) -> &'static [StepSpec<IntegratedStep>] {
        PLAN
    }

    fn cleanup_order(&self) -> &'static [FixtureKey] {
        &[VOTER, POLL, VOTE, SECOND_VOTE, SECOND_VOTER, ORPHAN_VOTE, ORPHAN_POLL, ORPHAN_VOTER]
    }

    async fn run_step(
        &self,
        step: IntegratedStep,
        ctx: &mut RunContext<'_>,
    ) -> Result<(), ScenarioFailure> {
        match step {
            IntegratedStep::ProvisionVoter => {
                let voter = voter_payload(ctx.id(VOTER)?);
                create_live(ctx, VOTER, &voter).await
            }
            IntegratedStep::ProvisionPoll => {
                let poll = poll_payload(ctx.id(POLL)?);
                create_live(ctx, POLL, &poll).await
            }
            IntegratedStep::VoteLinksToResults => Self::vote_links_to_results(ctx).await,
            IntegratedStep::ResultsCountIncrements => Self::results_count_increments(ctx).await,
            IntegratedStep::VoteLinksToVoter => Self::vote_links_to_voter(ctx).await,
            IntegratedStep::DeleteDoesNotCascade => Self::delete_does_not_cascade(ctx).await,
        }
    }
}
