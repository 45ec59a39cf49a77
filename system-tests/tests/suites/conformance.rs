// system-tests/tests/suites/conformance.rs
// ============================================================================
// Module: Conformance Tests
// Description: Ordering, selection, and namespace behavior of full runs.
// Purpose: Pin what the harness sends, not only what it concludes.
// Dependencies: system-tests helpers, voting-harness
// ============================================================================

//! ## Overview
//! Checks suite selection, fixture id namespaces, cleanup order, and how
//! the vote value mode meets the platform's counting rule.

use helpers::platform::TestResult;
use helpers::platform::ensure;
use helpers::platform::failure_message;
use helpers::platform::first_failure;
use helpers::platform::run_against;
use helpers::platform::run_with;
use helpers::platform::spawn_platform;
use system_tests::stub::Faults;
use system_tests::stub::StubConfig;
use system_tests::stub::StubPlatform;
use voting_harness::HarnessConfig;
use voting_harness::NamespaceMode;
use voting_harness::SuiteId;
use voting_harness::VoteValueMode;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn selected_suites_run_in_dependency_order() -> TestResult {
    let platform = spawn_platform(Faults::default())?;
    let (_, report) = run_against(&platform, &[SuiteId::Poll, SuiteId::Voter]).await?;

    let ran: Vec<SuiteId> = report.suites.iter().map(|suite| suite.suite).collect();
    ensure(ran == [SuiteId::Voter, SuiteId::Poll], || {
        format!("suites ran as {}", ran.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(","))
    })?;
    ensure(report.passed && report.not_run.is_empty(), || report.render_markdown())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn vote_cleanup_deletes_vote_then_voter_then_poll() -> TestResult {
    let platform = spawn_platform(Faults::default())?;
    let (_, report) = run_against(&platform, &[SuiteId::Vote]).await?;
    ensure(report.passed, || report.render_markdown())?;

    let requests = platform.requests();
    let tail: Vec<&str> = requests.iter().rev().take(3).rev().map(String::as_str).collect();
    let expected = ["DELETE /votes/", "DELETE /voters/", "DELETE /polls/"];
    let ordered = tail.len() == 3
        && tail.iter().zip(expected).all(|(line, prefix)| line.starts_with(prefix));
    ensure(ordered, || format!("cleanup tail was {}", tail.join(" | ")))?;
    ensure(platform.stored() == 0, || "vote suite left records behind".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn explicit_namespace_offsets_every_id() -> TestResult {
    let platform = spawn_platform(Faults::default())?;
    let mut config = platform.harness_config()?;
    config.namespace = NamespaceMode::Explicit(7);
    let (_, report) = run_with(config, &[SuiteId::Voter]).await?;
    ensure(report.passed, || report.render_markdown())?;
    ensure(report.namespace_base == 7, || "namespace base not reported".to_string())?;

    let requests = platform.requests();
    ensure(requests.iter().any(|line| line == "POST /voters/7001"), || {
        "first voter should be created as 7001".to_string()
    })?;
    let outside = requests.iter().filter(|line| line.starts_with("POST ")).find(|line| {
        let id = line.rsplit('/').next().and_then(|raw| raw.parse::<u64>().ok()).unwrap_or(0);
        !(7001..8000).contains(&id)
    });
    ensure(outside.is_none(), || {
        format!("write outside the namespace: {}", outside.map_or("", String::as_str))
    })?;
    Ok(())
}

/// Default harness configuration aimed at `platform`, built without reading
/// any stub setting.
fn default_config_for(platform: &StubPlatform) -> Result<HarnessConfig, String> {
    let mut config = HarnessConfig::defaults().map_err(|err| err.to_string())?;
    config.endpoints = platform.endpoints()?;
    config.namespace = NamespaceMode::Fixed;
    Ok(config)
}

#[tokio::test(flavor = "multi_thread")]
async fn default_harness_passes_against_index_counting_platform() -> TestResult {
    let platform = StubPlatform::spawn(StubConfig {
        faults: Faults::default(),
        vote_value: VoteValueMode::OptionIndex,
    })?;
    let config = default_config_for(&platform)?;
    ensure(config.vote_value == VoteValueMode::OptionIndex, || {
        format!("default vote value mode is {}", config.vote_value)
    })?;
    let (_, report) = run_with(config, &[]).await?;
    ensure(report.passed, || report.render_markdown())?;
    ensure(platform.stored() == 0, || "full run left records behind".to_string())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn option_id_mode_passes_against_id_counting_platform() -> TestResult {
    let platform = StubPlatform::spawn(StubConfig {
        faults: Faults::default(),
        vote_value: VoteValueMode::OptionId,
    })?;
    let mut config = default_config_for(&platform)?;
    config.vote_value = VoteValueMode::OptionId;
    let (_, report) = run_with(config, &[SuiteId::Integrated]).await?;
    ensure(report.passed, || report.render_markdown())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn mismatched_vote_value_mode_fails_count_step() -> TestResult {
    let platform = StubPlatform::spawn(StubConfig {
        faults: Faults::default(),
        vote_value: VoteValueMode::OptionId,
    })?;
    let (_, report) = run_with(default_config_for(&platform)?, &[SuiteId::Integrated]).await?;
    let failed = first_failure(&report, SuiteId::Integrated);
    ensure(failed.as_deref() == Some("results_count_increments"), || report.render_markdown())?;
    let message = failure_message(&report, SuiteId::Integrated, "results_count_increments")
        .unwrap_or_default();
    ensure(message.contains("option index 0 went from 0 to 0, expected 1"), || message.clone())?;
    Ok(())
}
