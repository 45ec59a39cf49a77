// crates/voting-harness/src/fixtures.rs
// ============================================================================
// Module: Fixture Ledger
// Description: Namespaced fixture ids and their lifecycle state for a run.
// Purpose: Replace literal ids with scoped allocation and explicit state.
// Dependencies: serde, voting-contract
// ============================================================================

//! ## Overview
//! Suites name the fixtures they use with a [`FixtureKey`]. The run's
//! [`FixtureLedger`] hands each key an id from the run's
//! [`FixtureNamespace`] on first use and tracks whether the entity behind it
//! is `Reserved` (never created), `Live`, or `Released`.
//! Invariants:
//! - Ids are `base * 1000 + n` with `n` counted per resource kind from 1.
//! - A key keeps its id for the whole run.
//! - Two namespaces with different bases never produce the same id.
//! - Every id fits a signed 64-bit integer; bases above
//!   [`MAX_NAMESPACE_BASE`] and ordinals past the namespace yield no id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use voting_contract::ResourceKind;

use crate::config::NamespaceMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Ids available per resource kind inside one namespace.
pub const IDS_PER_NAMESPACE: u64 = 1000;
/// Largest base whose ids all fit a signed 64-bit integer.
pub const MAX_NAMESPACE_BASE: u64 =
    (i64::MAX.unsigned_abs() - (IDS_PER_NAMESPACE - 1)) / IDS_PER_NAMESPACE;
/// Upper bound (exclusive) of wall-clock derived bases.
const PER_RUN_BASE_MODULUS: u64 = 1_000_000_000_000;

// ============================================================================
// SECTION: Namespace
// ============================================================================

/// Id namespace of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureNamespace {
    base: u64,
}

impl FixtureNamespace {
    /// Namespace whose ids start at 1 per kind.
    #[must_use]
    pub const fn fixed() -> Self {
        Self {
            base: 0,
        }
    }

    /// Namespace with an explicit base.
    #[must_use]
    pub const fn explicit(base: u64) -> Self {
        Self {
            base,
        }
    }

    /// Namespace derived from a millisecond timestamp.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            base: millis % PER_RUN_BASE_MODULUS,
        }
    }

    /// Namespace derived from the current wall clock.
    #[must_use]
    pub fn per_run() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        Self::from_millis(millis)
    }

    /// Resolves the configured mode.
    #[must_use]
    pub fn for_mode(mode: NamespaceMode) -> Self {
        match mode {
            NamespaceMode::Fixed => Self::fixed(),
            NamespaceMode::PerRun => Self::per_run(),
            NamespaceMode::Explicit(base) => Self::explicit(base),
        }
    }

    /// Returns the namespace base.
    #[must_use]
    pub const fn base(self) -> u64 {
        self.base
    }

    /// Returns true when the base can address ids.
    #[must_use]
    pub const fn is_addressable(self) -> bool {
        self.base <= MAX_NAMESPACE_BASE
    }

    /// Returns the `ordinal`-th id (1-based) of this namespace, or `None`
    /// when the ordinal is outside `1..IDS_PER_NAMESPACE` or the base is not
    /// addressable.
    #[must_use]
    pub const fn id(self, ordinal: u64) -> Option<u64> {
        if ordinal == 0 || ordinal >= IDS_PER_NAMESPACE || !self.is_addressable() {
            return None;
        }
        match self.base.checked_mul(IDS_PER_NAMESPACE) {
            Some(start) => start.checked_add(ordinal),
            None => None,
        }
    }
}

// ============================================================================
// SECTION: Keys and States
// ============================================================================

/// Named fixture slot declared by a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixtureKey {
    /// Resource kind of the fixture.
    pub kind: ResourceKind,
    /// Run-unique label.
    pub label: &'static str,
}

impl FixtureKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(kind: ResourceKind, label: &'static str) -> Self {
        Self {
            kind,
            label,
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.label)
    }
}

/// Lifecycle state of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureState {
    /// Id allocated; no entity was created with it.
    Reserved,
    /// Entity created and not yet deleted.
    Live,
    /// Entity deleted.
    Released,
}

impl fmt::Display for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reserved => "reserved",
            Self::Live => "live",
            Self::Released => "released",
        })
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureRecord {
    /// Fixture key, rendered as `kind:label`.
    pub key: String,
    /// Allocated id.
    pub id: u64,
    /// Current state.
    pub state: FixtureState,
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    key: FixtureKey,
    id: u64,
    state: FixtureState,
}

/// Fixture ids and states for one run.
#[derive(Debug, Clone)]
pub struct FixtureLedger {
    namespace: FixtureNamespace,
    allocated: [u64; 3],
    entries: Vec<Entry>,
}

impl FixtureLedger {
    /// Creates an empty ledger over `namespace`.
    #[must_use]
    pub const fn new(namespace: FixtureNamespace) -> Self {
        Self {
            namespace,
            allocated: [0; 3],
            entries: Vec::new(),
        }
    }

    /// Returns the run namespace.
    #[must_use]
    pub const fn namespace(&self) -> FixtureNamespace {
        self.namespace
    }

    /// Returns the id of `key`, allocating it on first use. Returns `None`
    /// when the namespace has no id left for the key's kind.
    pub fn reserve(&mut self, key: FixtureKey) -> Option<u64> {
        if let Some(entry) = self.entry(key) {
            return Some(entry.id);
        }
        let index = key.kind.index();
        let ordinal = self.allocated[index].checked_add(1)?;
        let id = self.namespace.id(ordinal)?;
        self.allocated[index] = ordinal;
        self.entries.push(Entry {
            key,
            id,
            state: FixtureState::Reserved,
        });
        Some(id)
    }

    /// Returns the id of `key` if allocated.
    #[must_use]
    pub fn id(&self, key: FixtureKey) -> Option<u64> {
        self.entry(key).map(|entry| entry.id)
    }

    /// Returns the state of `key` if allocated.
    #[must_use]
    pub fn state(&self, key: FixtureKey) -> Option<FixtureState> {
        self.entry(key).map(|entry| entry.state)
    }

    /// Returns true when `key` is live.
    #[must_use]
    pub fn is_live(&self, key: FixtureKey) -> bool {
        self.state(key) == Some(FixtureState::Live)
    }

    /// Records that the entity behind `key` now exists.
    pub fn mark_live(&mut self, key: FixtureKey) {
        self.set_state(key, FixtureState::Live);
    }

    /// Records that the entity behind `key` was deleted.
    pub fn mark_released(&mut self, key: FixtureKey) {
        self.set_state(key, FixtureState::Released);
    }

    /// Returns the live keys of `order`, in that order, with their ids.
    #[must_use]
    pub fn live_in(&self, order: &[FixtureKey]) -> Vec<(FixtureKey, u64)> {
        order
            .iter()
            .filter_map(|key| {
                self.entry(*key)
                    .filter(|entry| entry.state == FixtureState::Live)
                    .map(|entry| (*key, entry.id))
            })
            .collect()
    }

    /// Returns every row in allocation order.
    #[must_use]
    pub fn records(&self) -> Vec<FixtureRecord> {
        self.entries
            .iter()
            .map(|entry| FixtureRecord {
                key: entry.key.to_string(),
                id: entry.id,
                state: entry.state,
            })
            .collect()
    }

    fn entry(&self, key: FixtureKey) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    fn set_state(&mut self, key: FixtureKey, state: FixtureState) {
        if self.reserve(key).is_none() {
            return;
        }
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.state = state;
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
