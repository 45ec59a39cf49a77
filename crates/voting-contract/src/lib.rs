// crates/voting-contract/src/lib.rs
// ============================================================================
// Module: Voting Contract Library
// Description: Wire model for the Voters, Polls, and Votes resource services.
// Purpose: Give the harness one typed view of every request and response body.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The voting platform is three independent REST services. Each one owns a
//! single resource collection and returns it wrapped in the same hypermedia
//! envelope (`_links`, `_embedded`, `_meta`). This crate models those bodies
//! with lower camel-case wire names so the harness can write a payload, read
//! it back, and compare both sides field by field.
//! Invariants:
//! - Wire names match the services exactly; local names are snake case.
//! - Optional envelope fields are omitted when sending and tolerated when absent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod hypermedia;
pub mod identifiers;
pub mod resources;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hypermedia::Envelope;
pub use hypermedia::Link;
pub use hypermedia::LinkRelation;
pub use hypermedia::Links;
pub use hypermedia::Meta;
pub use identifiers::OptionId;
pub use identifiers::PollId;
pub use identifiers::VoteId;
pub use identifiers::VoterId;
pub use resources::Poll;
pub use resources::PollOption;
pub use resources::PollResult;
pub use resources::PollResults;
pub use resources::Resource;
pub use resources::ResourceKind;
pub use resources::Vote;
pub use resources::Voter;
pub use resources::VoterPoll;
