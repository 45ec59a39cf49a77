// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for voting harness system-tests.
// Purpose: Spawn stub platforms, run the harness, and keep run artifacts.
// Dependencies: system-tests, voting-harness
// ============================================================================

//! ## Overview
//! Shared helpers for voting harness system-tests.
//! Invariants:
//! - Every test gets its own stub platform and fixed fixture ids.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod platform;
