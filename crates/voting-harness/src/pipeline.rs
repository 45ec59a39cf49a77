// crates/voting-harness/src/pipeline.rs
// ============================================================================
// Module: Step Pipeline
// Description: Ordered execution of suite steps with fixture pre/postconditions.
// Purpose: Make inter-step dependencies explicit and enforce them at run time.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! A [`Suite`] declares an ordered plan of [`StepSpec`]s. Each step names the
//! fixtures it requires live, provides live, and releases. [`run_suite`]
//! executes the plan strictly in order:
//! - a step whose requirements are not live fails without any HTTP call;
//! - a passing step whose declared effects are not visible in the ledger fails;
//! - the first failure skips the remaining steps of the suite;
//! - cleanup runs afterwards regardless, deleting live fixtures in order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::time::Instant;

use serde::Serialize;

use crate::checks;
use crate::config::VoteValueMode;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::fixtures::FixtureLedger;
use crate::fixtures::FixtureState;
use crate::platform::Platform;
use crate::report::CleanupOutcome;
use crate::report::CleanupReport;
use crate::report::StepOutcome;
use crate::report::StepReport;
use crate::report::SuiteReport;
use crate::suites::SuiteId;

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// Whether a step prepares fixtures or asserts a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fixture provisioning prerequisite.
    Startup,
    /// Contract assertion.
    Scenario,
}

impl Phase {
    /// Returns the phase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Scenario => "scenario",
        }
    }
}

/// One planned step and its fixture contract.
#[derive(Debug, Clone, Copy)]
pub struct StepSpec<S> {
    /// Suite-local step identifier.
    pub id: S,
    /// Stable step name used in reports.
    pub name: &'static str,
    /// Startup or scenario.
    pub phase: Phase,
    /// Fixtures that must be live before the step.
    pub requires: &'static [FixtureKey],
    /// Fixtures that must be live after the step.
    pub provides: &'static [FixtureKey],
    /// Fixtures that must be released after the step.
    pub releases: &'static [FixtureKey],
}

// ============================================================================
// SECTION: Run Context
// ============================================================================

/// What a step may touch: the platform and the run's fixture ledger.
#[derive(Debug)]
pub struct RunContext<'a> {
    platform: &'a Platform,
    ledger: &'a mut FixtureLedger,
    vote_value: VoteValueMode,
}

impl<'a> RunContext<'a> {
    /// Creates a context.
    pub const fn new(
        platform: &'a Platform,
        ledger: &'a mut FixtureLedger,
        vote_value: VoteValueMode,
    ) -> Self {
        Self {
            platform,
            ledger,
            vote_value,
        }
    }

    /// Returns the platform clients.
    #[must_use]
    pub const fn platform(&self) -> &'a Platform {
        self.platform
    }

    /// Returns the fixture ledger.
    #[must_use]
    pub const fn ledger(&self) -> &FixtureLedger {
        &*self.ledger
    }

    /// Returns the fixture ledger for updates.
    pub const fn ledger_mut(&mut self) -> &mut FixtureLedger {
        &mut *self.ledger
    }

    /// Returns how vote values select options.
    #[must_use]
    pub const fn vote_value(&self) -> VoteValueMode {
        self.vote_value
    }

    /// Returns the id of `key`, allocating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::NamespaceExhausted`] when the namespace has
    /// no id left for `key`.
    pub fn id(&mut self, key: FixtureKey) -> Result<u64, ScenarioFailure> {
        self.ledger.reserve(key).ok_or_else(|| ScenarioFailure::NamespaceExhausted {
            key: key.to_string(),
            base: self.ledger.namespace().base(),
        })
    }
}

// ============================================================================
// SECTION: Suite Trait
// ============================================================================

/// An ordered plan of steps against the platform.
pub trait Suite {
    /// Suite-local step identifier.
    type Step: Copy + fmt::Debug + 'static;

    /// Suite identifier.
    const ID: SuiteId;

    /// Steps in execution order.
    fn plan(&self) -> &'static [StepSpec<Self::Step>];

    /// Fixtures deleted by cleanup, in deletion order.
    fn cleanup_order(&self) -> &'static [FixtureKey];

    /// Executes one step.
    fn run_step(
        &self,
        step: Self::Step,
        ctx: &mut RunContext<'_>,
    ) -> impl Future<Output = Result<(), ScenarioFailure>>;
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs `suite`'s plan and cleanup.
pub async fn run_suite<S: Suite>(suite: &S, ctx: &mut RunContext<'_>) -> SuiteReport {
    let suite_id = S::ID;
    let mut steps = Vec::with_capacity(suite.plan().len());
    let mut aborted = false;
    let mut fatal = None;

    for spec in suite.plan() {
        if aborted {
            tracing::info!(suite = %suite_id, step = spec.name, "step skipped");
            steps.push(StepReport {
                name: spec.name.to_string(),
                phase: spec.phase,
                outcome: StepOutcome::Skipped,
                duration_ms: 0,
            });
            continue;
        }

        let start = Instant::now();
        let result = match check_requires(spec, ctx.ledger()) {
            Ok(()) => match suite.run_step(spec.id, ctx).await {
                Ok(()) => check_effects(spec, ctx.ledger()),
                Err(failure) => Err(failure),
            },
            Err(failure) => Err(failure),
        };
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = match result {
            Ok(()) => {
                tracing::info!(suite = %suite_id, step = spec.name, duration_ms, "step passed");
                StepOutcome::Passed
            }
            Err(failure) => {
                tracing::warn!(
                    suite = %suite_id,
                    step = spec.name,
                    duration_ms,
                    error = %failure,
                    "step failed"
                );
                aborted = true;
                if failure.is_fatal() {
                    fatal = Some(failure.to_string());
                }
                StepOutcome::Failed {
                    message: failure.to_string(),
                }
            }
        };
        steps.push(StepReport {
            name: spec.name.to_string(),
            phase: spec.phase,
            outcome,
            duration_ms,
        });
    }

    let cleaned = cleanup(suite_id, suite.cleanup_order(), ctx).await;
    SuiteReport {
        suite: suite_id,
        steps,
        cleanup: cleaned,
        fatal,
    }
}

/// Deletes every live fixture of `order`, in order, and releases it.
///
/// Failures are reported and leave the fixture live; they never abort the
/// remaining deletions. Once every deletion succeeded, a second call does nothing.
pub async fn cleanup(
    suite: SuiteId,
    order: &[FixtureKey],
    ctx: &mut RunContext<'_>,
) -> Vec<CleanupReport> {
    let mut reports = Vec::new();
    for (key, id) in ctx.ledger().live_in(order) {
        let action = format!("delete {key} ({id})");
        let result = match ctx.platform().client(key.kind).delete(id).await {
            Ok(response) => checks::expect_ok(&action, &response),
            Err(err) => Err(ScenarioFailure::from(err)),
        };
        let outcome = match result {
            Ok(()) => {
                ctx.ledger_mut().mark_released(key);
                tracing::info!(%suite, fixture = %key, id, "cleanup deleted fixture");
                CleanupOutcome::Deleted
            }
            Err(failure) => {
                tracing::warn!(%suite, fixture = %key, id, error = %failure, "cleanup failed");
                CleanupOutcome::Failed {
                    message: failure.to_string(),
                }
            }
        };
        reports.push(CleanupReport {
            fixture: key.to_string(),
            id,
            outcome,
        });
    }
    reports
}

fn check_requires<S>(spec: &StepSpec<S>, ledger: &FixtureLedger) -> Result<(), ScenarioFailure> {
    for key in spec.requires {
        let state = ledger.state(*key);
        if state != Some(FixtureState::Live) {
            return Err(ScenarioFailure::PreconditionUnmet {
                key: key.to_string(),
                state: state_label(state),
            });
        }
    }
    Ok(())
}

fn check_effects<S>(spec: &StepSpec<S>, ledger: &FixtureLedger) -> Result<(), ScenarioFailure> {
    let expectations = spec
        .provides
        .iter()
        .map(|key| (key, FixtureState::Live))
        .chain(spec.releases.iter().map(|key| (key, FixtureState::Released)));
    for (key, expected) in expectations {
        let actual = ledger.state(*key);
        if actual != Some(expected) {
            return Err(ScenarioFailure::FixtureBookkeeping {
                key: key.to_string(),
                expected: expected.to_string(),
                actual: state_label(actual),
            });
        }
    }
    Ok(())
}

fn state_label(state: Option<FixtureState>) -> String {
    state.map_or_else(|| "unallocated".to_string(), |state| state.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
