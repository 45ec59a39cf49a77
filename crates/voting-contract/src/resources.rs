// crates/voting-contract/src/resources.rs
// ============================================================================
// Module: Voting Resources
// Description: Voter, Poll, and Vote bodies plus their nested collections.
// Purpose: Mirror each service's JSON representation one to one.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each resource is addressed as `{base}/{id}` on its own service and carries
//! a caller-assigned id. Polls own an ordered option list that is replaced
//! wholesale on update, plus server-computed results. Votes reference a poll
//! and a voter on the other two services.
//! Invariants:
//! - `Poll::results` is written by the Polls service only; it is omitted when
//!   sending an empty list.
//! - Nested collections keep wire order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::hypermedia::Envelope;
use crate::identifiers::OptionId;
use crate::identifiers::PollId;
use crate::identifiers::VoteId;
use crate::identifiers::VoterId;

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Decodes a JSON array, reading `null` as empty. The services encode an
/// unset collection as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ============================================================================
// SECTION: Resource Kinds
// ============================================================================

/// The three resource types hosted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Voters service.
    Voter,
    /// Polls service.
    Poll,
    /// Votes service.
    Vote,
}

impl ResourceKind {
    /// Every kind, in provisioning dependency order.
    pub const ALL: [Self; 3] = [Self::Voter, Self::Poll, Self::Vote];

    /// Returns the singular label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voter => "voter",
            Self::Poll => "poll",
            Self::Vote => "vote",
        }
    }

    /// Returns the collection path segment served by the owning service.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Voter => "voters",
            Self::Poll => "polls",
            Self::Vote => "votes",
        }
    }

    /// Returns the index of the kind inside [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Voter => 0,
            Self::Poll => 1,
            Self::Vote => 2,
        }
    }
}

/// Common surface of the three resource bodies.
pub trait Resource: Serialize + DeserializeOwned {
    /// Resource type served by the owning service.
    const KIND: ResourceKind;

    /// Returns the caller-assigned id as its raw wire value.
    fn raw_id(&self) -> u64;

    /// Returns the hypermedia envelope.
    fn envelope(&self) -> &Envelope;
}

// ============================================================================
// SECTION: Voter
// ============================================================================

/// One entry of a voter's participation history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterPoll {
    /// Poll the voter took part in.
    pub poll_id: PollId,
    /// Vote cast in that poll, as emitted by the Voters service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<VoteId>,
    /// Voter that cast the vote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<VoterId>,
    /// Time of the vote as emitted by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted_at: Option<String>,
}

/// Voter resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    /// Caller-assigned id.
    pub id: VoterId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact address; may be empty.
    #[serde(default)]
    pub email: String,
    /// Participation history.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub voter_polls: Vec<VoterPoll>,
    /// Hypermedia envelope.
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl Voter {
    /// Builds a voter payload with an empty history and envelope.
    #[must_use]
    pub fn new(id: VoterId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            voter_polls: Vec::new(),
            envelope: Envelope::default(),
        }
    }
}

impl Resource for Voter {
    const KIND: ResourceKind = ResourceKind::Voter;

    fn raw_id(&self) -> u64 {
        self.id.get()
    }

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

// ============================================================================
// SECTION: Poll
// ============================================================================

/// Selectable option of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PollOption {
    /// Option id, unique within the poll.
    pub id: OptionId,
    /// Option label.
    #[serde(default)]
    pub text: String,
}

impl PollOption {
    /// Creates an option.
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Aggregated vote count for one option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResult {
    /// Option the count belongs to.
    pub option_id: OptionId,
    /// Number of votes recorded for the option.
    #[serde(rename = "votes", alias = "voteCount", default)]
    pub vote_count: u64,
}

/// Poll resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Poll {
    /// Caller-assigned id.
    pub id: PollId,
    /// Short title.
    #[serde(default)]
    pub title: String,
    /// Question put to voters.
    #[serde(default)]
    pub question: String,
    /// Ordered options; replaced in full on update.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<PollOption>,
    /// Server-computed results, read-only for clients.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<PollResult>,
    /// Hypermedia envelope.
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl Poll {
    /// Builds a poll payload with no results and an empty envelope.
    #[must_use]
    pub fn new(
        id: PollId,
        title: impl Into<String>,
        question: impl Into<String>,
        options: Vec<PollOption>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            question: question.into(),
            options,
            results: Vec::new(),
            envelope: Envelope::default(),
        }
    }
}

impl Resource for Poll {
    const KIND: ResourceKind = ResourceKind::Poll;

    fn raw_id(&self) -> u64 {
        self.id.get()
    }

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

/// Body served behind a poll's `results` relation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PollResults {
    /// Per-option counts.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<PollResult>,
    /// Hypermedia envelope.
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl PollResults {
    /// Returns the count recorded for `option_id`, if the option is listed.
    #[must_use]
    pub fn count_for(&self, option_id: OptionId) -> Option<u64> {
        self.results.iter().find(|result| result.option_id == option_id).map(|r| r.vote_count)
    }

    /// Returns the count at position `index`, if present.
    #[must_use]
    pub fn count_at(&self, index: usize) -> Option<u64> {
        self.results.get(index).map(|result| result.vote_count)
    }
}

// ============================================================================
// SECTION: Vote
// ============================================================================

/// Vote resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Caller-assigned id.
    pub id: VoteId,
    /// Poll the vote belongs to; must exist on the Polls service.
    pub poll_id: PollId,
    /// Voter casting the vote; must exist on the Voters service.
    pub voter_id: VoterId,
    /// Selected option.
    #[serde(default)]
    pub vote_value: u64,
    /// Hypermedia envelope.
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl Vote {
    /// Builds a vote payload with an empty envelope.
    #[must_use]
    pub fn new(id: VoteId, poll_id: PollId, voter_id: VoterId, vote_value: u64) -> Self {
        Self {
            id,
            poll_id,
            voter_id,
            vote_value,
            envelope: Envelope::default(),
        }
    }
}

impl Resource for Vote {
    const KIND: ResourceKind = ResourceKind::Vote;

    fn raw_id(&self) -> u64 {
        self.id.get()
    }

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}
