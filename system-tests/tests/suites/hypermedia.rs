// system-tests/tests/suites/hypermedia.rs
// ============================================================================
// Module: Hypermedia Tests
// Description: Link following and aggregation against faulty stubs.
// Purpose: Prove cross-service hops use advertised links and counts are exact.
// Dependencies: system-tests helpers, voting-harness
// ============================================================================

use helpers::platform::TestResult;
use helpers::platform::ensure;
use helpers::platform::failure_message;
use helpers::platform::first_failure;
use helpers::platform::run_against;
use helpers::platform::spawn_platform;
use system_tests::stub::Faults;
use voting_contract::ResourceKind;
use voting_harness::Harness;
use voting_harness::SuiteId;
use voting_harness::suites::voter_payload;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn results_are_reached_through_vote_links() -> TestResult {
    let platform = spawn_platform(Faults::default())?;
    let (_, report) = run_against(&platform, &[SuiteId::Integrated]).await?;
    ensure(report.passed, || report.render_markdown())?;
    let followed = platform
        .requests()
        .iter()
        .any(|line| line.starts_with("GET /polls/") && line.ends_with("/results"));
    ensure(followed, || "results link was never followed".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn broken_links_fail_first_link_step() -> TestResult {
    let platform = spawn_platform(Faults {
        broken_links: true,
        ..Faults::default()
    })?;
    let (_, report) = run_against(&platform, &[SuiteId::Integrated]).await?;
    let failed = first_failure(&report, SuiteId::Integrated);
    ensure(failed.as_deref() == Some("vote_links_to_results"), || report.render_markdown())?;
    let verbatim = platform.requests().iter().any(|line| line.ends_with("/tally"));
    ensure(verbatim, || "advertised href was not followed verbatim".to_string())?;
    ensure(platform.stored() == 0, || "cleanup left records behind".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn misdirected_voter_link_fails_voter_link_step() -> TestResult {
    const BYSTANDER: u64 = 5_000_000;
    let platform = spawn_platform(Faults {
        misdirected_voter_links: true,
        ..Faults::default()
    })?;
    let harness = Harness::from_config(platform.harness_config()?)?;
    let seeded = harness.platform().voters().create(&voter_payload(BYSTANDER)).await?;
    ensure(seeded.is_ok(), || format!("seeding voter {BYSTANDER} returned {}", seeded.status))?;

    let report = harness.run(&[SuiteId::Integrated]).await;
    let failed = first_failure(&report, SuiteId::Integrated);
    ensure(failed.as_deref() == Some("vote_links_to_voter"), || report.render_markdown())?;
    let message =
        failure_message(&report, SuiteId::Integrated, "vote_links_to_voter").unwrap_or_default();
    ensure(message.contains("id") && message.contains(&BYSTANDER.to_string()), || {
        message.clone()
    })?;
    ensure(platform.contains(ResourceKind::Voter, BYSTANDER), || {
        "cleanup removed a voter the run never created".to_string()
    })?;
    ensure(platform.stored() == 1, || "scenario leftovers were not removed".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn lagging_aggregates_fail_count_step() -> TestResult {
    let platform = spawn_platform(Faults {
        lagging_aggregates: true,
        ..Faults::default()
    })?;
    let (_, report) = run_against(&platform, &[SuiteId::Integrated]).await?;
    let failed = first_failure(&report, SuiteId::Integrated);
    ensure(failed.as_deref() == Some("results_count_increments"), || report.render_markdown())?;
    let message = failure_message(&report, SuiteId::Integrated, "results_count_increments")
        .unwrap_or_default();
    ensure(message.contains("went from 1 to 1, expected 2"), || message.clone())?;
    ensure(platform.stored() == 0, || "scenario leftovers were not removed".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cascading_deletes_fail_orphan_step() -> TestResult {
    let platform = spawn_platform(Faults {
        cascading_deletes: true,
        ..Faults::default()
    })?;
    let (_, report) = run_against(&platform, &[SuiteId::Integrated]).await?;
    let failed = first_failure(&report, SuiteId::Integrated);
    ensure(failed.as_deref() == Some("delete_does_not_cascade"), || report.render_markdown())?;
    Ok(())
}
