// crates/voting-harness/src/suites/voter.rs
// ============================================================================
// Module: Voter Suite
// Description: Create, duplicate-reject, and delete lifecycle for voters.
// Purpose: Prove the Voters service honors id uniqueness and deletion.
// Dependencies: voting-contract
// ============================================================================

use voting_contract::ResourceKind;

use super::SuiteId;
use super::create_live;
use super::create_rejected;
use super::delete_released;
use super::expect_gone;
use super::verify_stored;
use super::voter_payload;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::pipeline::Phase;
use crate::pipeline::RunContext;
use crate::pipeline::StepSpec;
use crate::pipeline::Suite;

/// Voter created by `create_and_verify` and kept for the duplicate check.
pub const PRIMARY: FixtureKey = FixtureKey::new(ResourceKind::Voter, "voter.primary");
/// Voter created and deleted by `create_then_delete`.
pub const EPHEMERAL: FixtureKey = FixtureKey::new(ResourceKind::Voter, "voter.ephemeral");

/// Steps of the voter suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoterStep {
    /// POST a voter and compare the GET.
    CreateAndVerify,
    /// Re-POST the same id.
    DuplicateIdRejected,
    /// POST, DELETE, then GET must fail.
    CreateThenDelete,
}

const PLAN: &[StepSpec<VoterStep>] = &[
    StepSpec {
        id: VoterStep::CreateAndVerify,
        name: "create_and_verify",
        phase: Phase::Scenario,
        requires: &[],
        provides: &[PRIMARY],
        releases: &[],
    },
    StepSpec {
        id: VoterStep::DuplicateIdRejected,
        name: "duplicate_id_rejected",
        phase: Phase::Scenario,
        requires: &[PRIMARY],
        provides: &[PRIMARY],
        releases: &[],
    },
    StepSpec {
        id: VoterStep::CreateThenDelete,
        name: "create_then_delete",
        phase: Phase::Scenario,
        requires: &[],
        provides: &[],
        releases: &[EPHEMERAL],
    },
];

/// Voter lifecycle suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoterSuite;

impl Suite for VoterSuite {
    type Step = VoterStep;

    const ID: SuiteId = SuiteId::Voter;

    fn plan(&self) -> &'static [StepSpec<VoterStep>] {
        PLAN
    }

    fn cleanup_order(&self) -> &'static [FixtureKey] {
        &[PRIMARY, EPHEMERAL]
    }

    async fn run_step(
        &self,
        step: VoterStep,
        ctx: &mut RunContext<'_>,
    ) -> Result<(), ScenarioFailure> {
        match step {
            VoterStep::CreateAndVerify => {
                let voter = voter_payload(ctx.id(PRIMARY)?);
                create_live(ctx, PRIMARY, &voter).await?;
                verify_stored(ctx, &voter).await.map(drop)
            }
            VoterStep::DuplicateIdRejected => {
                let voter = voter_payload(ctx.id(PRIMARY)?);
                create_rejected(ctx, PRIMARY, &voter, "create duplicate voter").await
            }
            VoterStep::CreateThenDelete => {
                let voter = voter_payload(ctx.id(EPHEMERAL)?);
                create_live(ctx, EPHEMERAL, &voter).await?;
                delete_released(ctx, EPHEMERAL).await?;
                expect_gone(ctx, EPHEMERAL).await
            }
        }
    }
}
