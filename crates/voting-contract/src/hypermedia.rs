// crates/voting-contract/src/hypermedia.rs
// ============================================================================
// Module: Hypermedia Envelope
// Description: HAL-style links, embedded payloads, and metadata.
// Purpose: Share one envelope shape across voters, polls, and votes.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! All three services wrap their resources in the same envelope: a `_links`
//! object keyed by relation name, an opaque `_embedded` payload, and advisory
//! `_meta` counters. [`Envelope`] is flattened into each resource so presence
//! and absence follow one convention everywhere.
//! Invariants:
//! - A relation whose `href` is empty is treated as absent.
//! - `_meta` timestamps are advisory and never used for ordering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Links
// ============================================================================

/// Closed set of link relations emitted by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRelation {
    /// The resource itself.
    SelfLink,
    /// Poll referenced by the resource.
    Poll,
    /// Vote referenced by the resource, or the votes collection.
    Vote,
    /// Votes collection.
    Votes,
    /// Voter referenced by the resource.
    Voter,
    /// Voters collection.
    Voters,
    /// Polls collection.
    Polls,
    /// Aggregated results of the referenced poll.
    Results,
}

impl LinkRelation {
    /// Every relation, in wire order.
    pub const ALL: [Self; 8] = [
        Self::SelfLink,
        Self::Poll,
        Self::Vote,
        Self::Votes,
        Self::Voter,
        Self::Voters,
        Self::Polls,
        Self::Results,
    ];

    /// Returns the relation name used as the `_links` key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfLink => "self",
            Self::Poll => "poll",
            Self::Vote => "vote",
            Self::Votes => "votes",
            Self::Voter => "voter",
            Self::Voters => "voters",
            Self::Polls => "polls",
            Self::Results => "results",
        }
    }
}

/// Single hypermedia pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Absolute or relative target URL.
    #[serde(default)]
    pub href: String,
}

impl Link {
    /// Creates a link to the given target.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
        }
    }
}

/// `_links` object keyed by relation name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Links {
    /// `self` relation.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,
    /// `poll` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<Link>,
    /// `vote` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<Link>,
    /// `votes` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Link>,
    /// `voter` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter: Option<Link>,
    /// `voters` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voters: Option<Link>,
    /// `polls` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polls: Option<Link>,
    /// `results` relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Link>,
}

impl Links {
    /// Returns the link for `relation` when present with a non-empty href.
    #[must_use]
    pub fn get(&self, relation: LinkRelation) -> Option<&Link> {
        let slot = match relation {
            LinkRelation::SelfLink => &self.self_link,
            LinkRelation::Poll => &self.poll,
            LinkRelation::Vote => &self.vote,
            LinkRelation::Votes => &self.votes,
            LinkRelation::Voter => &self.voter,
            LinkRelation::Voters => &self.voters,
            LinkRelation::Polls => &self.polls,
            LinkRelation::Results => &self.results,
        };
        slot.as_ref().filter(|link| !link.href.trim().is_empty())
    }

    /// Sets the link for `relation`.
    pub fn set(&mut self, relation: LinkRelation, link: Link) {
        let slot = match relation {
            LinkRelation::SelfLink => &mut self.self_link,
            LinkRelation::Poll => &mut self.poll,
            LinkRelation::Vote => &mut self.vote,
            LinkRelation::Votes => &mut self.votes,
            LinkRelation::Voter => &mut self.voter,
            LinkRelation::Voters => &mut self.voters,
            LinkRelation::Polls => &mut self.polls,
            LinkRelation::Results => &mut self.results,
        };
        *slot = Some(link);
    }

    /// Returns true when no relation carries a usable href.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        LinkRelation::ALL.iter().all(|relation| self.get(*relation).is_none())
    }
}

// ============================================================================
// SECTION: Meta
// ============================================================================

/// Advisory counters and timestamps attached by the services.
///
/// # Invariants
/// - Keys keep the services' capitalised spelling.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Number of polls the resource participates in.
    #[serde(rename = "TotalPolls", default, skip_serializing_if = "Option::is_none")]
    pub total_polls: Option<i64>,
    /// Number of votes recorded against the resource.
    #[serde(rename = "TotalVotes", default, skip_serializing_if = "Option::is_none")]
    pub total_votes: Option<i64>,
    /// Creation timestamp as emitted by the service.
    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp as emitted by the service.
    #[serde(rename = "UpdatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Hypermedia envelope shared by every resource type.
///
/// # Invariants
/// - `links` is always present after decoding (empty when the service sent none).
/// - `embedded` and `meta` are `None` when absent or `null` on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// `_links` relations.
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    /// `_embedded` payload, opaque to the harness.
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Value>,
    /// `_meta` counters.
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}
