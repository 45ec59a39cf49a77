// system-tests/src/bin/voting_platform_stub.rs
// ============================================================================
// Module: Voting Platform Stub Server
// Description: Serves the stub platform on the default service ports.
// Purpose: Give manual `voting-harness run` sessions a local platform.
// Dependencies: axum, tokio, tracing-subscriber, system-tests
// ============================================================================

//! Binds the votes, voters, and polls ports (1080, 1081, 1082) to one shared
//! stub platform so the CLI defaults work without any configuration.

use std::process::ExitCode;

use system_tests::stub::StubConfig;
use system_tests::stub::StubState;
use system_tests::stub::router;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

/// Service ports in votes, voters, polls order.
const PORTS: [u16; 3] = [1080, 1081, 1082];

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let state = StubState::new(StubConfig::default());
    let mut servers = JoinSet::new();
    for port in PORTS {
        let listener = match TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(port, error = %err, "bind failed");
                return ExitCode::FAILURE;
            }
        };
        tracing::info!(port, "stub platform listening");
        let app = router(&state);
        servers.spawn(async move { axum::serve(listener, app).await });
    }

    while let Some(outcome) = servers.join_next().await {
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(error = %err, "server failed");
                return ExitCode::FAILURE;
            }
            Err(err) => {
                tracing::error!(error = %err, "server task failed");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
