// system-tests/tests/suites/violations.rs
// ============================================================================
// Module: Contract Violation Tests
// Description: Runs against stubs that break one CRUD contract each.
// Purpose: Prove each violation fails the step that owns the contract.
// Dependencies: system-tests helpers, voting-harness
// ============================================================================

//! ## Overview
//! Every test switches on a single fault and checks that the run fails at
//! exactly the step responsible for that contract.

use helpers::platform::TestResult;
use helpers::platform::ensure;
use helpers::platform::failure_message;
use helpers::platform::first_failure;
use helpers::platform::run_against;
use helpers::platform::spawn_platform;
use system_tests::stub::Faults;
use voting_harness::StepOutcome;
use voting_harness::SuiteId;

use crate::helpers;

/// Runs `suite` against a stub with `faults` and expects `step` to fail first.
async fn expect_detected(faults: Faults, suite: SuiteId, step: &str) -> Result<String, String> {
    let platform = spawn_platform(faults)?;
    let (_, report) = run_against(&platform, &[suite]).await?;
    ensure(!report.passed, || format!("{suite} passed against a faulty platform"))?;
    let failed = first_failure(&report, suite);
    ensure(failed.as_deref() == Some(step), || {
        format!("expected {step} to fail first, got {}", failed.as_deref().unwrap_or("none"))
    })?;
    ensure(report.fatal.is_none(), || "contract violations must not be fatal".to_string())?;
    failure_message(&report, suite, step).ok_or_else(|| format!("{step} has no message"))
}

#[tokio::test(flavor = "multi_thread")]
async fn permissive_duplicates_fail_duplicate_step() -> TestResult {
    let faults = Faults {
        permissive_duplicates: true,
        ..Faults::default()
    };
    for suite in [SuiteId::Voter, SuiteId::Poll, SuiteId::Vote] {
        let message = expect_detected(faults, suite, "duplicate_id_rejected").await?;
        ensure(message.contains("expected rejection"), || message.clone())?;
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_poll_check_fails_poll_reference_step() -> TestResult {
    let faults = Faults {
        skip_poll_check: true,
        ..Faults::default()
    };
    let message = expect_detected(faults, SuiteId::Vote, "missing_poll_rejected").await?;
    ensure(message.contains("expected rejection"), || message.clone())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_voter_check_fails_voter_reference_step() -> TestResult {
    let faults = Faults {
        skip_voter_check: true,
        ..Faults::default()
    };
    let message = expect_detected(faults, SuiteId::Vote, "missing_voter_rejected").await?;
    ensure(message.contains("expected rejection"), || message.clone())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_reads_fail_delete_step() -> TestResult {
    let faults = Faults {
        stale_reads: true,
        ..Faults::default()
    };
    let message = expect_detected(faults, SuiteId::Voter, "create_then_delete").await?;
    ensure(message.contains("expected absence after delete"), || message.clone())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn merged_updates_fail_update_step() -> TestResult {
    let faults = Faults {
        merge_updates: true,
        ..Faults::default()
    };
    let message = expect_detected(faults, SuiteId::Poll, "update_replaces_options").await?;
    ensure(message.contains("mismatch"), || message.clone())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_suite_still_cleans_up() -> TestResult {
    let platform = spawn_platform(Faults {
        permissive_duplicates: true,
        ..Faults::default()
    })?;
    let (_, report) = run_against(&platform, &[SuiteId::Voter]).await?;
    let voter = report.suite(SuiteId::Voter).ok_or("voter suite missing")?;
    let skipped = voter.step("create_then_delete").map(|step| &step.outcome);
    ensure(skipped == Some(&StepOutcome::Skipped), || "later steps must be skipped".to_string())?;
    ensure(!voter.cleanup.is_empty(), || "cleanup did not run".to_string())?;
    ensure(platform.stored() == 0, || "failed suite left records behind".to_string())?;
    Ok(())
}
