// crates/voting-harness/src/suites/poll.rs
// ============================================================================
// Module: Poll Suite
// Description: Poll lifecycle plus wholesale option replacement on update.
// Purpose: Prove the Polls service honors uniqueness, deletion, and PUT semantics.
// Dependencies: voting-contract
// ============================================================================

//! ## Overview
//! Same three lifecycle scenarios as the voter suite, plus
//! `update_replaces_options`: a poll created with two options is PUT with a
//! new title and four options, and the read-back must carry exactly the four
//! PUT options in order.

use voting_contract::OptionId;
use voting_contract::PollOption;
use voting_contract::ResourceKind;

use super::SuiteId;
use super::create_live;
use super::create_rejected;
use super::delete_released;
use super::expect_gone;
use super::poll_payload;
use super::verify_stored;
use crate::checks;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::pipeline::Phase;
use crate::pipeline::RunContext;
use crate::pipeline::StepSpec;
use crate::pipeline::Suite;

/// Poll created by `create_and_verify`.
pub const PRIMARY: FixtureKey = FixtureKey::new(ResourceKind::Poll, "poll.primary");
/// Poll created and deleted by `create_then_delete`.
pub const EPHEMERAL: FixtureKey = FixtureKey::new(ResourceKind::Poll, "poll.ephemeral");
/// Poll created, updated, and deleted by `update_replaces_options`.
pub const UPDATABLE: FixtureKey = FixtureKey::new(ResourceKind::Poll, "poll.updatable");

/// Steps of the poll suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// POST a poll and compare the GET.
    CreateAndVerify,
    /// Re-POST the same id.
    DuplicateIdRejected,
    /// POST, DELETE, then GET must fail.
    CreateThenDelete,
    /// POST two options, PUT four, GET must show exactly the four.
    UpdateReplacesOptions,
}

const PLAN: &[StepSpec<PollStep>] = &[
    StepSpec {
        id: PollStep::CreateAndVerify,
        name: "create_and_verify",
        phase: Phase::Scenario,
        requires: &[],
        provides: &[PRIMARY],
        releases: &[],
    },
    StepSpec {
        id: PollStep::DuplicateIdRejected,
        name: "duplicate_id_rejected",
        phase: Phase::Scenario,
        requires: &[PRIMARY],
        provides: &[PRIMARY],
        releases: &[],
    },
    StepSpec {
        id: PollStep::CreateThenDelete,
        name: "create_then_delete",
        phase: Phase::Scenario,
        requires: &[],
        provides: &[],
        releases: &[EPHEMERAL],
    },
    StepSpec {
        id: PollStep::UpdateReplacesOptions,
        name: "update_replaces_options",
        phase: Phase::Scenario,
        requires: &[],
        provides: &[],
        releases: &[UPDATABLE],
    },
];

/// Poll lifecycle suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollSuite;

impl Suite for PollSuite {
    type Step = PollStep;

    const ID: SuiteId = SuiteId::Poll;

    fn plan(&self) -> &'static [StepSpec<PollStep>] {
        PLAN
    }

    fn cleanup_order(&self) -> &'static [FixtureKey] {
        &[PRIMARY, EPHEMERAL, UPDATABLE]
    }

    async fn run_step(
        &self,
        step: PollStep,
        ctx: &mut RunContext<'_>,
    ) -> Result<(), ScenarioFailure> {
        match step {
            PollStep::CreateAndVerify => {
                let poll = poll_payload(ctx.id(PRIMARY)?);
                create_live(ctx, PRIMARY, &poll).await?;
                verify_stored(ctx, &poll).await.map(drop)
            }
            PollStep::DuplicateIdRejected => {
                let poll = poll_payload(ctx.id(PRIMARY)?);
                create_rejected(ctx, PRIMARY, &poll, "create duplicate poll").await
            }
            PollStep::CreateThenDelete => {
                let poll = poll_payload(ctx.id(EPHEMERAL)?);
                create_live(ctx, EPHEMERAL, &poll).await?;
                delete_released(ctx, EPHEMERAL).await?;
                expect_gone(ctx, EPHEMERAL).await
            }
            PollStep::UpdateReplacesOptions => {
                let original = poll_payload(ctx.id(UPDATABLE)?);
                create_live(ctx, UPDATABLE, &original).await?;

                let mut updated = original;
                updated.title = "Test2".to_string();
                updated.options = (1..=4)
                    .map(|n| PollOption::new(OptionId::new(n), format!("Test{n}")))
                    .collect();
                let action = format!("update poll {}", updated.id);
                let response = ctx.platform().polls().update(&updated).await?;
                checks::expect_ok(&action, &response)?;
                verify_stored(ctx, &updated).await?;

                delete_released(ctx, UPDATABLE).await
            }
        }
    }
}
