// crates/voting-harness/src/suites/vote.rs
// ============================================================================
// Module: Vote Suite
// Description: Vote lifecycle and cross-service referential integrity.
// Purpose: Prove votes need an existing poll and voter and honor uniqueness.
// Dependencies: voting-contract
// ============================================================================

//! ## Overview
//! Startup provisions one voter and one poll. The referential-integrity
//! scenarios point a fresh vote at a poll or voter id that was reserved in
//! the run namespace but never created, so the reference is guaranteed to
//! dangle. Cleanup deletes votes first, then the voter, then the poll.

use voting_contract::PollId;
use voting_contract::ResourceKind;
use voting_contract::Vote;
use voting_contract::VoteId;
use voting_contract::VoterId;

use super::SuiteId;
use super::create_live;
use super::create_rejected;
use super::delete_released;
use super::expect_gone;
use super::poll_payload;
use super::verify_stored;
use super::vote_value_for;
use super::voter_payload;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::pipeline::Phase;
use crate::pipeline::RunContext;
use crate::pipeline::StepSpec;
use crate::pipeline::Suite;

/// Voter every vote of the suite is cast by.
pub const VOTER: FixtureKey = FixtureKey::new(ResourceKind::Voter, "vote.voter");
/// Poll every vote of the suite is cast in.
pub const POLL: FixtureKey = FixtureKey::new(ResourceKind::Poll, "vote.poll");
/// Vote created by `create_and_verify`.
pub const PRIMARY: FixtureKey = FixtureKey::new(ResourceKind::Vote, "vote.primary");
/// Vote created and deleted by `create_then_delete`.
pub const EPHEMERAL: FixtureKey = FixtureKey::new(ResourceKind::Vote, "vote.ephemeral");
/// Poll id reserved and never created.
pub const MISSING_POLL: FixtureKey = FixtureKey::new(ResourceKind::Poll, "vote.missing_poll");
/// Voter id reserved and never created.
pub const MISSING_VOTER: FixtureKey = FixtureKey::new(ResourceKind::Voter, "vote.missing_voter");
/// Vote referencing the missing poll.
pub const DANGLING_POLL_VOTE: FixtureKey =
    FixtureKey::new(ResourceKind::Vote, "vote.dangling_poll");
/// Vote referencing the missing voter.
pub const DANGLING_VOTER_VOTE: FixtureKey =
    FixtureKey::new(ResourceKind::Vote, "vote.dangling_voter");

/// Steps of the vote suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStep {
    /// Create the voter fixture.
    ProvisionVoter,
    /// Create the poll fixture.
    ProvisionPoll,
    /// POST a vote and compare the GET.
    CreateAndVerify,
    /// Re-POST the same vote id.
    DuplicateIdRejected,
    /// Fresh vote id, nonexistent poll.
    MissingPollRejected,
    /// Fresh vote id, nonexistent voter.
    MissingVoterRejected,
    /// POST, DELETE, then GET must fail.
    CreateThenDelete,
}

const PLAN: &[StepSpec<VoteStep>] = &[
    StepSpec {
        id: VoteStep::ProvisionVoter,
        name: "provision_voter",
        phase: Phase::Startup,
        requires: &[],
        provides: &[VOTER],
        releases: &[],
    },
    StepSpec {
        id: VoteStep::ProvisionPoll,
        name: "provision_poll",
        phase: Phase::Startup,
        requires: &[],
        provides: &[POLL],
        releases: &[],
    },
    StepSpec {
        id: VoteStep::CreateAndVerify,
        name: "create_and_verify",
        phase: Phase::Scenario,
        requires: &[VOTER, POLL],
        provides: &[PRIMARY],
        releases: &[],
    },
    StepSpec {
        id: VoteStep::DuplicateIdRejected,
        name: "duplicate_id_rejected",
        phase: Phase::Scenario,
        requires: &[PRIMARY],
        provides: &[PRIMARY],
        releases: &[],
    },
    StepSpec {
        id: VoteStep::MissingPollRejected,
        name: "missing_poll_rejected",
        phase: Phase::Scenario,
        requires: &[VOTER],
        provides: &[],
        releases: &[],
    },
    StepSpec {
        id: VoteStep::MissingVoterRejected,
        name: "missing_voter_rejected",
        phase: Phase::Scenario,
        requires: &[POLL],
        provides: &[],
        releases: &[],
    },
    StepSpec {
        id: VoteStep::CreateThenDelete,
        name: "create_then_delete",
        phase: Phase::Scenario,
        requires: &[VOTER, POLL],
        provides: &[],
        releases: &[EPHEMERAL],
    },
];

/// Vote lifecycle suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoteSuite;

impl VoteSuite {
    /// Vote `key` cast by the suite voter in the suite poll.
    fn vote(ctx: &mut RunContext<'_>, key: FixtureKey) -> Result<Vote, ScenarioFailure> {
        let poll = poll_payload(ctx.id(POLL)?);
        let value = vote_value_for(ctx.vote_value(), &poll, 0);
        Ok(Vote::new(VoteId::new(ctx.id(key)?), poll.id, VoterId::new(ctx.id(VOTER)?), value))
    }
}

impl Suite for VoteSuite {
    type Step = VoteStep;

    const ID: SuiteId = SuiteId::Vote;

    fn plan(&self) -> &'static [StepSpec<VoteStep>] {
        PLAN
    }

    fn cleanup_order(&self) -> &'static [FixtureKey] {
        &[PRIMARY, EPHEMERAL, DANGLING_POLL_VOTE, DANGLING_VOTER_VOTE, VOTER, POLL]
    }

    async fn run_step(
        &self,
        step: VoteStep,
        ctx: &mut RunContext<'_>,
    ) -> Result<(), ScenarioFailure> {
        match step {
            VoteStep::ProvisionVoter => {
                let voter = voter_payload(ctx.id(VOTER)?);
                create_live(ctx, VOTER, &voter).await
            }
            VoteStep::ProvisionPoll => {
                let poll = poll_payload(ctx.id(POLL)?);
                create_live(ctx, POLL, &poll).await
            }
            VoteStep::CreateAndVerify => {
                let vote = Self::vote(ctx, PRIMARY)?;
                create_live(ctx, PRIMARY, &vote).await?;
                verify_stored(ctx, &vote).await.map(drop)
            }
            VoteStep::DuplicateIdRejected => {
                let vote = Self::vote(ctx, PRIMARY)?;
                create_rejected(ctx, PRIMARY, &vote, "create duplicate vote").await
            }
            VoteStep::MissingPollRejected => {
                let mut vote = Self::vote(ctx, DANGLING_POLL_VOTE)?;
                vote.poll_id = PollId::new(ctx.id(MISSING_POLL)?);
                let action = format!("create vote {} for missing poll {}", vote.id, vote.poll_id);
                create_rejected(ctx, DANGLING_POLL_VOTE, &vote, &action).await
            }
            VoteStep::MissingVoterRejected => {
                let mut vote = Self::vote(ctx, DANGLING_VOTER_VOTE)?;
                vote.voter_id = VoterId::new(ctx.id(MISSING_VOTER)?);
                let action = format!("create vote {} for missing voter {}", vote.id, vote.voter_id);
                create_rejected(ctx, DANGLING_VOTER_VOTE, &vote, &action).await
            }
            VoteStep::CreateThenDelete => {
                let vote = Self::vote(ctx, EPHEMERAL)?;
                create_live(ctx, EPHEMERAL, &vote).await?;
                delete_released(ctx, EPHEMERAL).await?;
                expect_gone(ctx, EPHEMERAL).await
            }
        }
    }
}
