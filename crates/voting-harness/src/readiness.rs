// crates/voting-harness/src/readiness.rs
// ============================================================================
// Module: Readiness Check
// Description: Health polling for the three services before a run.
// Purpose: Start suites only once the platform answers, without fixed sleeps.
// Dependencies: tokio, tracing
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use tokio::time::sleep;
use voting_contract::ResourceKind;

use crate::error::HarnessError;
use crate::platform::Platform;

/// Delay between health checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polls `GET {base}/health` on every service until each returns 200.
///
/// # Errors
///
/// Returns [`HarnessError::NotReady`] for the first service that does not
/// answer 200 within `timeout`.
pub async fn wait_for_platform(platform: &Platform, timeout: Duration) -> Result<(), HarnessError> {
    let start = Instant::now();
    for kind in ResourceKind::ALL {
        let client = platform.client(kind);
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            let last = match client.health().await {
                Ok(response) if response.is_ok() => break,
                Ok(response) => format!("status {}", response.status),
                Err(err) => err.to_string(),
            };
            if start.elapsed() > timeout {
                return Err(HarnessError::NotReady {
                    service: kind.collection().to_string(),
                    attempts,
                    last,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
        tracing::debug!(service = kind.collection(), attempts, "service ready");
    }
    Ok(())
}
