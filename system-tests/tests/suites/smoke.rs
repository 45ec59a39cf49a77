// system-tests/tests/suites/smoke.rs
// ============================================================================
// Module: Smoke Tests
// Description: Full harness run against a compliant stub platform.
// Purpose: Prove the happy path end to end, including cleanup and artifacts.
// Dependencies: system-tests helpers, voting-harness
// ============================================================================

//! ## Overview
//! A compliant platform must pass every step of every suite, and cleanup
//! must leave nothing behind.

use std::time::Duration;

use helpers::artifacts::TestArtifacts;
use helpers::platform::TestResult;
use helpers::platform::ensure;
use helpers::platform::run_against;
use helpers::platform::run_with;
use helpers::platform::spawn_platform;
use serde_json::Value;
use system_tests::stub::Faults;
use voting_harness::SuiteId;
use voting_harness::report::CleanupOutcome;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn compliant_platform_passes_every_suite() -> TestResult {
    let platform = spawn_platform(Faults::default())?;
    let (harness, report) = run_against(&platform, &[]).await?;
    let run_dir = TestArtifacts::new("compliant_platform_passes_every_suite")
        .record(&harness, &report)?;

    ensure(report.passed, || report.render_markdown())?;
    ensure(report.suites.len() == 4 && report.not_run.is_empty(), || {
        "every suite should run".to_string()
    })?;
    let (passed, failed, skipped) = report.step_counts();
    ensure((passed, failed, skipped) == (20, 0, 0), || {
        format!("expected 20 passed steps, got {passed} passed, {failed} failed, {skipped} skipped")
    })?;
    let all_deleted = report
        .suites
        .iter()
        .flat_map(|suite| &suite.cleanup)
        .all(|entry| entry.outcome == CleanupOutcome::Deleted);
    ensure(all_deleted, || "a cleanup deletion failed".to_string())?;
    ensure(platform.stored() == 0, || {
        format!("cleanup left {} records behind", platform.stored())
    })?;

    let summary: Value = serde_json::from_slice(&std::fs::read(run_dir.join("summary.json"))?)?;
    ensure(summary["passed"] == Value::Bool(true), || "summary.json verdict".to_string())?;
    let transcript: Value =
        serde_json::from_slice(&std::fs::read(run_dir.join("transcript.json"))?)?;
    ensure(transcript.as_array().is_some_and(|entries| !entries.is_empty()), || {
        "transcript.json is empty".to_string()
    })?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn readiness_check_runs_before_any_write() -> TestResult {
    let platform = spawn_platform(Faults::default())?;
    let mut config = platform.harness_config()?;
    config.ready_timeout = Some(Duration::from_secs(5));
    let (_, report) = run_with(config, &[SuiteId::Voter]).await?;

    ensure(report.passed, || report.render_markdown())?;
    let requests = platform.requests();
    let first_post = requests.iter().position(|line| line.starts_with("POST ")).unwrap_or(0);
    for collection in ["voters", "polls", "votes"] {
        let health = format!("GET /{collection}/health");
        let position = requests.iter().position(|line| *line == health);
        ensure(position.is_some_and(|at| at < first_post), || {
            format!("{health} missing before the first POST")
        })?;
    }
    Ok(())
}
