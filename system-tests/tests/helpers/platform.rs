// system-tests/tests/helpers/platform.rs
// ============================================================================
// Module: Platform Helpers
// Description: Stub platform startup and harness run helpers.
// Purpose: Keep end-to-end tests short and uniform.
// Dependencies: system-tests, voting-harness
// ============================================================================

use std::net::TcpListener;
use std::time::Duration;

use system_tests::stub::Faults;
use system_tests::stub::StubConfig;
use system_tests::stub::StubPlatform;
use url::Url;
use voting_harness::Harness;
use voting_harness::HarnessConfig;
use voting_harness::RunReport;
use voting_harness::StepOutcome;
use voting_harness::SuiteId;

/// Result alias for system-test bodies.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Spawns a stub platform with the given faults.
pub fn spawn_platform(faults: Faults) -> Result<StubPlatform, String> {
    StubPlatform::spawn(StubConfig {
        faults,
        ..StubConfig::default()
    })
}

/// Runs `selection` against `config` and returns the harness with its report.
pub async fn run_with(
    config: HarnessConfig,
    selection: &[SuiteId],
) -> Result<(Harness, RunReport), String> {
    let harness = Harness::from_config(config).map_err(|err| err.to_string())?;
    let report = harness.run(selection).await;
    Ok((harness, report))
}

/// Runs `selection` against `platform` with its default harness configuration.
pub async fn run_against(
    platform: &StubPlatform,
    selection: &[SuiteId],
) -> Result<(Harness, RunReport), String> {
    run_with(platform.harness_config()?, selection).await
}

/// Returns the name of the first failed step of `suite`.
pub fn first_failure(report: &RunReport, suite: SuiteId) -> Option<String> {
    report.suite(suite)?.first_failure().map(|step| step.name.clone())
}

/// Returns the failure message of `step` in `suite`.
pub fn failure_message(report: &RunReport, suite: SuiteId, step: &str) -> Option<String> {
    match &report.suite(suite)?.step(step)?.outcome {
        StepOutcome::Failed {
            message,
        } => Some(message.clone()),
        _ => None,
    }
}

/// Returns a harness configuration whose endpoints refuse connections.
pub fn unreachable_config() -> Result<HarnessConfig, String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    drop(listener);
    let url = |collection: &str| {
        Url::parse(&format!("http://{addr}/{collection}")).map_err(|err| err.to_string())
    };
    let mut config = HarnessConfig::defaults().map_err(|err| err.to_string())?;
    config.endpoints.voters = url("voters")?;
    config.endpoints.polls = url("polls")?;
    config.endpoints.votes = url("votes")?;
    config.timeout = Duration::from_secs(2);
    Ok(config)
}

/// Fails with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), String> {
    if condition { Ok(()) } else { Err(message()) }
}
