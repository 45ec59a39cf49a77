// system-tests/tests/suites/run_control.rs
// ============================================================================
// Module: Run Control Tests
// Description: Fatal transport failures and readiness timeouts.
// Purpose: Ensure infrastructure failures stop the run and are reported.
// Dependencies: system-tests helpers, voting-harness
// ============================================================================

use std::time::Duration;

use helpers::platform::TestResult;
use helpers::platform::ensure;
use helpers::platform::run_with;
use helpers::platform::spawn_platform;
use helpers::platform::unreachable_config;
use system_tests::stub::Faults;
use voting_harness::StepOutcome;
use voting_harness::SuiteId;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_platform_stops_after_first_suite() -> TestResult {
    let (harness, report) = run_with(unreachable_config()?, &[]).await?;

    ensure(!report.passed && report.fatal.is_some(), || report.render_markdown())?;
    ensure(report.suites.len() == 1, || "only the voter suite should run".to_string())?;
    ensure(report.not_run == [SuiteId::Poll, SuiteId::Vote, SuiteId::Integrated], || {
        "remaining suites should be reported as not run".to_string()
    })?;
    let voter = report.suite(SuiteId::Voter).ok_or("voter suite missing")?;
    let skipped = voter.steps.iter().skip(1).all(|step| step.outcome == StepOutcome::Skipped);
    ensure(skipped && voter.fatal.is_some(), || report.render_markdown())?;
    let failed_exchange = harness.transcript().iter().any(|entry| entry.error.is_some());
    ensure(failed_exchange, || "transport failure missing from transcript".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unhealthy_platform_fails_readiness_before_any_suite() -> TestResult {
    let platform = spawn_platform(Faults {
        unhealthy: true,
        ..Faults::default()
    })?;
    let mut config = platform.harness_config()?;
    config.ready_timeout = Some(Duration::from_secs(1));
    let (_, report) = run_with(config, &[]).await?;

    ensure(!report.passed && report.suites.is_empty(), || report.render_markdown())?;
    ensure(report.not_run == SuiteId::ALL, || "every suite should be not run".to_string())?;
    let fatal = report.fatal.clone().unwrap_or_default();
    ensure(fatal.contains("voter"), || fatal.clone())?;
    let wrote = platform.requests().iter().any(|line| !line.starts_with("GET "));
    ensure(!wrote, || "no write may happen before readiness".to_string())?;
    Ok(())
}
