// system-tests/src/lib.rs
// ============================================================================
// Module: Voting Harness System Tests Library
// Description: Stub voting platform shared by system tests and the stub binary.
// Purpose: Run the harness end to end without the real services.
// Dependencies: axum, tokio, voting-contract, voting-harness
// ============================================================================

//! ## Overview
//! This crate hosts the in-process stub platform used by the end-to-end
//! tests in `system-tests/tests` and by the `voting_platform_stub` binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod stub;
