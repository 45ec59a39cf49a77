// crates/voting-harness/src/report.rs
// ============================================================================
// Module: Run Report
// Description: Step, cleanup, and run outcomes plus artifact writers.
// Purpose: Record what happened in a run and persist it for review.
// Dependencies: serde, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! [`RunReport`] is the single result of a harness run. It can be rendered
//! as canonical JSON (`summary.json`), Markdown (`summary.md`), and written
//! next to the request transcript (`transcript.json`).
//! Invariants:
//! - `passed` is true iff every executed step passed and no fatal error occurred.
//! - Cleanup failures are reported but never change `passed`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::error::HarnessError;
use crate::fixtures::FixtureRecord;
use crate::pipeline::Phase;
use crate::requester::TranscriptEntry;
use crate::suites::SuiteId;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step passed.
    Passed,
    /// Step failed.
    Failed {
        /// Failure description.
        message: String,
    },
    /// Step not run because an earlier step of the suite failed.
    Skipped,
}

impl StepOutcome {
    /// Short label for logs and summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed {
                ..
            } => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Report of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Step name.
    pub name: String,
    /// Startup or scenario.
    pub phase: Phase,
    /// Outcome.
    pub outcome: StepOutcome,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

/// Outcome of one cleanup deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// Fixture deleted.
    Deleted,
    /// Deletion failed; the fixture may be left behind.
    Failed {
        /// Failure description.
        message: String,
    },
}

/// Report of one cleanup deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Fixture key.
    pub fixture: String,
    /// Fixture id.
    pub id: u64,
    /// Outcome.
    pub outcome: CleanupOutcome,
}

/// Report of one suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite identifier.
    pub suite: SuiteId,
    /// Steps in plan order.
    pub steps: Vec<StepReport>,
    /// Cleanup deletions in cleanup order.
    pub cleanup: Vec<CleanupReport>,
    /// Fatal error that stopped the run inside this suite.
    pub fatal: Option<String>,
}

impl SuiteReport {
    /// Returns true when every executed step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|step| !matches!(step.outcome, StepOutcome::Failed { .. }))
            && self.fatal.is_none()
    }

    /// Returns the first failed step, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|step| matches!(step.outcome, StepOutcome::Failed { .. }))
    }

    /// Returns the report of the named step.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|step| step.name == name)
    }
}

/// Result of a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Fixture namespace base.
    pub namespace_base: u64,
    /// Suites that ran, in run order.
    pub suites: Vec<SuiteReport>,
    /// Selected suites that did not run because of a fatal error.
    pub not_run: Vec<SuiteId>,
    /// Fatal error that stopped the run.
    pub fatal: Option<String>,
    /// Fixture ledger at the end of the run.
    pub fixtures: Vec<FixtureRecord>,
    /// Overall verdict.
    pub passed: bool,
}

impl RunReport {
    /// Assembles a report and computes the verdict.
    #[must_use]
    pub fn new(
        namespace_base: u64,
        suites: Vec<SuiteReport>,
        not_run: Vec<SuiteId>,
        fatal: Option<String>,
        fixtures: Vec<FixtureRecord>,
    ) -> Self {
        let passed = fatal.is_none() && suites.iter().all(SuiteReport::passed);
        Self {
            namespace_base,
            suites,
            not_run,
            fatal,
            fixtures,
            passed,
        }
    }

    /// Returns the report of `suite`, if it ran.
    #[must_use]
    pub fn suite(&self, suite: SuiteId) -> Option<&SuiteReport> {
        self.suites.iter().find(|report| report.suite == suite)
    }

    /// Counts of passed, failed, and skipped steps.
    #[must_use]
    pub fn step_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for step in self.suites.iter().flat_map(|suite| &suite.steps) {
            match step.outcome {
                StepOutcome::Passed => counts.0 += 1,
                StepOutcome::Failed {
                    ..
                } => counts.1 += 1,
                StepOutcome::Skipped => counts.2 += 1,
            }
        }
        counts
    }

    /// Number of cleanup deletions that failed.
    #[must_use]
    pub fn cleanup_failures(&self) -> usize {
        self.suites
            .iter()
            .flat_map(|suite| &suite.cleanup)
            .filter(|entry| matches!(entry.outcome, CleanupOutcome::Failed { .. }))
            .count()
    }

    /// Renders the report as Markdown.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let verdict = if self.passed { "PASS" } else { "FAIL" };
        let (passed, failed, skipped) = self.step_counts();
        let _ = writeln!(out, "# Voting Harness Run\n");
        let _ = writeln!(out, "- Verdict: {verdict}");
        let _ = writeln!(out, "- Namespace base: {}", self.namespace_base);
        let _ = writeln!(out, "- Steps: {passed} passed, {failed} failed, {skipped} skipped");
        let _ = writeln!(out, "- Cleanup failures: {}", self.cleanup_failures());
        if let Some(fatal) = &self.fatal {
            let _ = writeln!(out, "- Fatal: {fatal}");
        }
        for suite in &self.suites {
            let _ = writeln!(out, "\n## {}\n", suite.suite);
            let _ = writeln!(out, "| Step | Phase | Outcome | ms |");
            let _ = writeln!(out, "|---|---|---|---|");
            for step in &suite.steps {
                let outcome = match &step.outcome {
                    StepOutcome::Failed {
                        message,
                    } => format!("failed: {}", message.replace('|', "\\|")),
                    other => other.label().to_string(),
                };
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    step.name,
                    step.phase.as_str(),
                    outcome,
                    step.duration_ms
                );
            }
            if !suite.cleanup.is_empty() {
                out.push('\n');
            }
            for entry in &suite.cleanup {
                let outcome = match &entry.outcome {
                    CleanupOutcome::Deleted => "deleted".to_string(),
                    CleanupOutcome::Failed {
                        message,
                    } => format!("FAILED: {message}"),
                };
                let _ = writeln!(out, "- cleanup {} ({}): {outcome}", entry.fixture, entry.id);
            }
            if let Some(fatal) = &suite.fatal {
                let _ = writeln!(out, "\nFatal in this suite: {fatal}");
            }
        }
        if !self.not_run.is_empty() {
            let names: Vec<&str> = self.not_run.iter().map(|suite| suite.as_str()).collect();
            let _ = writeln!(out, "\nNot run: {}", names.join(", "));
        }
        out
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Writes `summary.json`, `summary.md`, and `transcript.json` into a fresh
/// `run_<millis>` directory under `root` and returns that directory.
///
/// # Errors
///
/// Returns [`HarnessError::Artifacts`] when serialization or I/O fails.
pub fn write_artifacts(
    root: &Path,
    report: &RunReport,
    transcript: &[TranscriptEntry],
) -> Result<PathBuf, HarnessError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    let mut dir = root.join(format!("run_{millis}"));
    let mut suffix = 1u32;
    while dir.exists() {
        dir = root.join(format!("run_{millis}_{suffix}"));
        suffix = suffix.saturating_add(1);
    }
    fs::create_dir_all(&dir).map_err(|err| artifact_error(&dir, &err))?;

    let summary = serde_jcs::to_vec(report).map_err(|err| artifact_error(&dir, &err))?;
    write_file(&dir.join("summary.json"), &summary)?;
    write_file(&dir.join("summary.md"), report.render_markdown().as_bytes())?;
    let transcript =
        serde_json::to_vec_pretty(transcript).map_err(|err| artifact_error(&dir, &err))?;
    write_file(&dir.join("transcript.json"), &transcript)?;
    Ok(dir)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), HarnessError> {
    fs::write(path, bytes).map_err(|err| artifact_error(path, &err))
}

fn artifact_error(path: &Path, err: &dyn std::fmt::Display) -> HarnessError {
    HarnessError::Artifacts {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
