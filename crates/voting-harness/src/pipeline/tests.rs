// crates/voting-harness/src/pipeline/tests.rs
// ============================================================================
// Module: Step Pipeline Tests
// Description: Unit tests for plan ordering, fixture contracts, and cleanup.
// Purpose: Prove abort, skip, precondition, and cleanup rules with a fake suite.
// Dependencies: tiny_http, tokio
// ============================================================================

//! ## Overview
//! A fake suite manipulates the ledger directly; only cleanup talks HTTP, to
//! a local `tiny_http` server that answers every DELETE with a fixed status.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use tiny_http::Response;
use tiny_http::Server;
use url::Url;
use voting_contract::ResourceKind;

use super::Phase;
use super::RunContext;
use super::StepSpec;
use super::Suite;
use super::cleanup;
use super::run_suite;
use crate::config::ServiceEndpoints;
use crate::config::VoteValueMode;
use crate::failure::ScenarioFailure;
use crate::fixtures::FixtureKey;
use crate::fixtures::FixtureLedger;
use crate::fixtures::FixtureNamespace;
use crate::fixtures::FixtureState;
use crate::platform::Platform;
use crate::report::CleanupOutcome;
use crate::report::StepOutcome;
use crate::requester::RequestError;
use crate::requester::Requester;
use crate::suites::SuiteId;

// ============================================================================
// SECTION: Fake Suite
// ============================================================================

const ALPHA: FixtureKey = FixtureKey::new(ResourceKind::Voter, "alpha");
const BETA: FixtureKey = FixtureKey::new(ResourceKind::Poll, "beta");

#[derive(Debug, Clone, Copy)]
enum FakeStep {
    Provision,
    Observe,
    Release,
    Reject,
    Disconnect,
    Forget,
}

const fn step(
    id: FakeStep,
    name: &'static str,
    requires: &'static [FixtureKey],
    provides: &'static [FixtureKey],
    releases: &'static [FixtureKey],
) -> StepSpec<FakeStep> {
    StepSpec {
        id,
        name,
        phase: Phase::Scenario,
        requires,
        provides,
        releases,
    }
}

const PROVISION: StepSpec<FakeStep> = step(FakeStep::Provision, "provision", &[], &[ALPHA], &[]);
const OBSERVE: StepSpec<FakeStep> = step(FakeStep::Observe, "observe", &[ALPHA], &[], &[]);
const RELEASE: StepSpec<FakeStep> = step(FakeStep::Release, "release", &[ALPHA], &[], &[ALPHA]);
const REJECT: StepSpec<FakeStep> = step(FakeStep::Reject, "reject", &[], &[], &[]);
const DISCONNECT: StepSpec<FakeStep> = step(FakeStep::Disconnect, "disconnect", &[], &[], &[]);
const FORGET: StepSpec<FakeStep> = step(FakeStep::Forget, "forget", &[], &[BETA], &[]);

struct FakeSuite {
    plan: &'static [StepSpec<FakeStep>],
}

impl Suite for FakeSuite {
    type Step = FakeStep;

    const ID: SuiteId = SuiteId::Voter;

    fn plan(&self) -> &'static [StepSpec<FakeStep>] {
        self.plan
    }

    fn cleanup_order(&self) -> &'static [FixtureKey] {
        &[BETA, ALPHA]
    }

    async fn run_step(
        &self,
        step: FakeStep,
        ctx: &mut RunContext<'_>,
    ) -> Result<(), ScenarioFailure> {
        match step {
            FakeStep::Provision => {
                ctx.ledger_mut().mark_live(ALPHA);
                Ok(())
            }
            FakeStep::Observe | FakeStep::Forget => Ok(()),
            FakeStep::Release => {
                ctx.ledger_mut().mark_released(ALPHA);
                Ok(())
            }
            FakeStep::Reject => Err(ScenarioFailure::UnexpectedSuccess {
                action: "duplicate".to_string(),
            }),
            FakeStep::Disconnect => Err(ScenarioFailure::Transport(RequestError::Transport {
                method: crate::requester::HttpMethod::Get,
                url: "http://127.0.0.1:9/voters/1".to_string(),
                reason: "connection refused".to_string(),
            })),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serves `count` requests with `status` and returns their request lines.
fn serve(count: usize, status: u16) -> (Url, thread::JoinHandle<Vec<String>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = Url::parse(&format!("http://{addr}/voters")).unwrap();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..count {
            let request = server.recv().unwrap();
            seen.push(format!("{} {}", request.method(), request.url()));
            request.respond(Response::from_string("").with_status_code(status)).unwrap();
        }
        seen
    });
    (url, handle)
}

fn platform(voters: &Url) -> Platform {
    let mut endpoints = ServiceEndpoints::local_defaults().unwrap();
    endpoints.voters = voters.clone();
    endpoints.polls = voters.join("/polls").unwrap();
    Platform::new(&endpoints, Requester::new(Duration::from_secs(5)).unwrap())
}

fn offline_platform() -> Platform {
    platform(&Url::parse("http://127.0.0.1:9/voters").unwrap())
}

fn outcomes(report: &crate::report::SuiteReport) -> Vec<&'static str> {
    report.steps.iter().map(|step| step.outcome.label()).collect()
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn passing_plan_runs_in_order_and_cleans_up() {
    let (url, handle) = serve(1, 200);
    let platform = platform(&url);
    let mut ledger = FixtureLedger::new(FixtureNamespace::explicit(5));
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[PROVISION, OBSERVE],
    };
    let report = run_suite(&suite, &mut ctx).await;

    assert_eq!(report.suite, SuiteId::Voter);
    assert_eq!(outcomes(&report), vec!["passed", "passed"]);
    assert!(report.passed());
    assert_eq!(report.cleanup.len(), 1);
    assert_eq!(report.cleanup[0].fixture, "voter:alpha");
    assert_eq!(report.cleanup[0].outcome, CleanupOutcome::Deleted);
    assert_eq!(handle.join().unwrap(), vec!["DELETE /voters/5001".to_string()]);
    assert_eq!(ledger.state(ALPHA), Some(FixtureState::Released));
}

#[tokio::test(flavor = "multi_thread")]
async fn first_failure_skips_remaining_steps_but_cleanup_runs() {
    let (url, handle) = serve(1, 200);
    let platform = platform(&url);
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[PROVISION, REJECT, OBSERVE],
    };
    let report = run_suite(&suite, &mut ctx).await;

    assert_eq!(outcomes(&report), vec!["passed", "failed", "skipped"]);
    assert!(!report.passed());
    assert_eq!(report.first_failure().unwrap().name, "reject");
    assert!(report.fatal.is_none());
    assert_eq!(report.cleanup[0].outcome, CleanupOutcome::Deleted);
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn transport_failure_is_fatal() {
    let platform = offline_platform();
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[DISCONNECT, OBSERVE],
    };
    let report = run_suite(&suite, &mut ctx).await;

    assert_eq!(outcomes(&report), vec!["failed", "skipped"]);
    assert!(report.fatal.as_deref().unwrap().contains("connection refused"));
}

// ============================================================================
// SECTION: Fixture Contracts
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn unmet_requirement_fails_before_running() {
    let platform = offline_platform();
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[OBSERVE],
    };
    let report = run_suite(&suite, &mut ctx).await;

    let StepOutcome::Failed {
        message,
    } = &report.steps[0].outcome
    else {
        panic!("expected failure");
    };
    assert_eq!(message, "fixture voter:alpha must be live before the step, but is unallocated");
    assert!(report.cleanup.is_empty());
    assert!(platform.requester().transcript().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn undeclared_effect_is_a_bookkeeping_failure() {
    let platform = offline_platform();
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[FORGET],
    };
    let report = run_suite(&suite, &mut ctx).await;

    let StepOutcome::Failed {
        message,
    } = &report.steps[0].outcome
    else {
        panic!("expected failure");
    };
    assert_eq!(message, "fixture poll:beta should be live after the step, but is unallocated");
}

#[tokio::test(flavor = "multi_thread")]
async fn released_fixtures_are_not_cleaned_again() {
    let platform = offline_platform();
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[PROVISION, RELEASE],
    };
    let report = run_suite(&suite, &mut ctx).await;

    assert!(report.passed());
    assert!(report.cleanup.is_empty());
}

// ============================================================================
// SECTION: Cleanup
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn cleanup_is_idempotent() {
    let (url, handle) = serve(2, 200);
    let platform = platform(&url);
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    ledger.mark_live(ALPHA);
    ledger.mark_live(BETA);
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let order = [BETA, ALPHA];
    let first = cleanup(SuiteId::Voter, &order, &mut ctx).await;
    let second = cleanup(SuiteId::Voter, &order, &mut ctx).await;

    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
    assert_eq!(
        handle.join().unwrap(),
        vec!["DELETE /polls/1".to_string(), "DELETE /voters/1".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn cleanup_failure_is_reported_without_changing_verdict() {
    let (url, handle) = serve(1, 500);
    let platform = platform(&url);
    let mut ledger = FixtureLedger::new(FixtureNamespace::fixed());
    let mut ctx = RunContext::new(&platform, &mut ledger, VoteValueMode::OptionId);

    let suite = FakeSuite {
        plan: &[PROVISION],
    };
    let report = run_suite(&suite, &mut ctx).await;
    handle.join().unwrap();

    assert!(report.passed());
    assert!(matches!(report.cleanup[0].outcome, CleanupOutcome::Failed { .. }));
    assert!(ledger.is_live(ALPHA));
}
