// crates/voting-contract/src/identifiers.rs
// ============================================================================
// Module: Voting Identifiers
// Description: Typed identifiers for voters, polls, votes, and poll options.
// Purpose: Keep caller-assigned ids from being mixed up across resource types.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every entity on the platform carries a caller-assigned integer id. The
//! services do not generate ids, so the harness picks them and must never
//! confuse a poll id with a voter id when wiring up a vote. Each identifier
//! serializes as a bare number on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares a transparent integer identifier with the shared accessor set.
macro_rules! integer_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates the identifier from its raw wire value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw wire value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

integer_id!(
    /// Voter identifier, unique within the Voters service.
    VoterId
);

integer_id!(
    /// Poll identifier, unique within the Polls service.
    PollId
);

integer_id!(
    /// Vote identifier, unique within the Votes service.
    VoteId
);

integer_id!(
    /// Option identifier, unique within a single poll.
    OptionId
);
