// crates/voting-harness/src/harness.rs
// ============================================================================
// Module: Harness
// Description: Run entry point tying configuration, clients, and suites together.
// Purpose: Execute selected suites in dependency order and produce a report.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! [`Harness::run`] rejects namespaces whose ids would not fit the services,
//! waits for readiness (when configured), then runs the
//! selected suites in the fixed order Voter, Poll, Vote, Integrated over one
//! fixture ledger. A fatal failure in one suite stops the run after that
//! suite's cleanup; the remaining selected suites are reported as not run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fixtures::FixtureLedger;
use crate::fixtures::FixtureNamespace;
use crate::fixtures::MAX_NAMESPACE_BASE;
use crate::pipeline::RunContext;
use crate::pipeline::run_suite;
use crate::platform::Platform;
use crate::readiness::wait_for_platform;
use crate::report::RunReport;
use crate::report::SuiteReport;
use crate::requester::Requester;
use crate::requester::TranscriptEntry;
use crate::suites::IntegratedSuite;
use crate::suites::PollSuite;
use crate::suites::SuiteId;
use crate::suites::VoteSuite;
use crate::suites::VoterSuite;

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Configured harness, ready to run.
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    platform: Platform,
}

impl Harness {
    /// Builds the HTTP clients for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Request`] when the HTTP client cannot be built.
    pub fn from_config(config: HarnessConfig) -> Result<Self, HarnessError> {
        let requester = Requester::new(config.timeout)?;
        let platform = Platform::new(&config.endpoints, requester);
        Ok(Self {
            config,
            platform,
        })
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Returns the platform clients.
    #[must_use]
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Returns every exchange made so far.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.platform.requester().transcript()
    }

    /// Runs the suites in `selection` (all suites when empty) in dependency
    /// order.
    pub async fn run(&self, selection: &[SuiteId]) -> RunReport {
        let namespace = FixtureNamespace::for_mode(self.config.namespace);
        let selected: Vec<SuiteId> = SuiteId::ALL
            .into_iter()
            .filter(|suite| selection.is_empty() || selection.contains(suite))
            .collect();
        tracing::info!(
            namespace = namespace.base(),
            suites = %selected.iter().map(|suite| suite.as_str()).collect::<Vec<_>>().join(","),
            "harness run starting"
        );

        if !namespace.is_addressable() {
            let error = format!(
                "namespace base {} exceeds the largest usable base {MAX_NAMESPACE_BASE}",
                namespace.base()
            );
            tracing::error!(%error, "namespace rejected");
            return RunReport::new(namespace.base(), Vec::new(), selected, Some(error), Vec::new());
        }

        let mut ledger = FixtureLedger::new(namespace);
        if let Some(timeout) = self.config.ready_timeout
            && let Err(err) = wait_for_platform(&self.platform, timeout).await
        {
            tracing::error!(error = %err, "platform not ready");
            return RunReport::new(
                namespace.base(),
                Vec::new(),
                selected,
                Some(err.to_string()),
                ledger.records(),
            );
        }

        let mut reports = Vec::new();
        let mut not_run = Vec::new();
        let mut fatal = None;
        for suite in selected {
            if fatal.is_some() {
                not_run.push(suite);
                continue;
            }
            let report = self.run_one(suite, &mut ledger).await;
            if let Some(error) = &report.fatal {
                tracing::error!(%suite, %error, "fatal failure; stopping run");
                fatal = Some(error.clone());
            }
            reports.push(report);
        }

        let report = RunReport::new(namespace.base(), reports, not_run, fatal, ledger.records());
        tracing::info!(passed = report.passed, "harness run finished");
        report
    }

    async fn run_one(&self, suite: SuiteId, ledger: &mut FixtureLedger) -> SuiteReport {
        let mut ctx = RunContext::new(&self.platform, ledger, self.config.vote_value);
        match suite {
            SuiteId::Voter => run_suite(&VoterSuite, &mut ctx).await,
            SuiteId::Poll => run_suite(&PollSuite, &mut ctx).await,
            SuiteId::Vote => run_suite(&VoteSuite, &mut ctx).await,
            SuiteId::Integrated => run_suite(&IntegratedSuite, &mut ctx).await,
        }
    }
}
