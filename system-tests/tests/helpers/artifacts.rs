// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Keep each test's harness report and transcript for review.
// Dependencies: voting-harness
// ============================================================================

use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use voting_harness::Harness;
use voting_harness::RunReport;
use voting_harness::write_artifacts;

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Artifact root for one system-test under `target/system-tests`.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
}

impl TestArtifacts {
    /// Chooses the artifact root for `test_name`.
    pub fn new(test_name: &str) -> Self {
        Self {
            root: PathBuf::from("target/system-tests")
                .join(format!("session_{}", now_millis()))
                .join(test_name),
        }
    }

    /// Writes the report and transcript of `harness` and returns the run directory.
    pub fn record(&self, harness: &Harness, report: &RunReport) -> Result<PathBuf, String> {
        write_artifacts(&self.root, report, &harness.transcript()).map_err(|err| err.to_string())
    }
}
