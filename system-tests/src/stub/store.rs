// system-tests/src/stub/store.rs
// ============================================================================
// Module: Stub Platform Store
// Description: In-memory voters, polls, and votes with switchable faults.
// Purpose: Model a compliant platform and the contract violations it can exhibit.
// Dependencies: serde_json, voting-contract, voting-harness
// ============================================================================

//! ## Overview
//! [`Store`] holds the three collections and answers each operation with
//! either a JSON body (HTTP 200) or a rejection status. Resources are stored
//! without envelopes; links, results, and participation history are rendered
//! on every read.
//! Invariants:
//! - Success is always 200; rejections are 404, 409, or 422.
//! - With no faults enabled every contract the harness checks holds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use voting_contract::Link;
use voting_contract::LinkRelation;
use voting_contract::Poll;
use voting_contract::PollOption;
use voting_contract::PollResult;
use voting_contract::PollResults;
use voting_contract::ResourceKind;
use voting_contract::Vote;
use voting_contract::Voter;
use voting_contract::VoterPoll;
use voting_harness::VoteValueMode;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Contract violations the stub can be switched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools, reason = "Each flag is an independent fault switch.")]
pub struct Faults {
    /// Accept a create for an existing id and overwrite the stored record.
    pub permissive_duplicates: bool,
    /// Accept votes whose poll does not exist.
    pub skip_poll_check: bool,
    /// Accept votes whose voter does not exist.
    pub skip_voter_check: bool,
    /// Answer deletes with 200 but keep serving the record.
    pub stale_reads: bool,
    /// Append updated poll options to the stored ones instead of replacing them.
    pub merge_updates: bool,
    /// Emit vote `results` and `voter` links that lead nowhere.
    pub broken_links: bool,
    /// Point each vote's `voter` link at another stored voter when one exists.
    pub misdirected_voter_links: bool,
    /// Freeze each poll's results endpoint at its first answer.
    pub lagging_aggregates: bool,
    /// Delete a poll's or voter's votes along with it.
    pub cascading_deletes: bool,
    /// Answer health checks with 503.
    pub unhealthy: bool,
}

/// Stub behavior settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StubConfig {
    /// Enabled faults.
    pub faults: Faults,
    /// How `voteValue` selects an option when counting; by position unless
    /// set otherwise.
    pub vote_value: VoteValueMode,
}

/// Rejection status returned by a store operation.
pub type Rejection = StatusCode;

// ============================================================================
// SECTION: Store
// ============================================================================

/// In-memory platform state.
#[derive(Debug, Default)]
pub struct Store {
    config: StubConfig,
    voters: BTreeMap<u64, Voter>,
    polls: BTreeMap<u64, Poll>,
    votes: BTreeMap<u64, Vote>,
    frozen_results: BTreeMap<u64, Vec<PollResult>>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: StubConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the stub settings.
    #[must_use]
    pub const fn config(&self) -> StubConfig {
        self.config
    }

    /// Returns true when a record of `kind` with `id` is stored.
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, id: u64) -> bool {
        match kind {
            ResourceKind::Voter => self.voters.contains_key(&id),
            ResourceKind::Poll => self.polls.contains_key(&id),
            ResourceKind::Vote => self.votes.contains_key(&id),
        }
    }

    /// Number of stored records across every collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voters.len() + self.polls.len() + self.votes.len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Status of the health endpoint.
    #[must_use]
    pub const fn health(&self) -> StatusCode {
        if self.config.faults.unhealthy {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::OK
        }
    }

    /// Stores a new record addressed by `id`.
    ///
    /// # Errors
    ///
    /// Returns 422 for an undecodable body, an id that disagrees with the
    /// path, or a vote with a missing poll or voter; 409 for a duplicate id.
    pub fn create(
        &mut self,
        kind: ResourceKind,
        id: u64,
        body: &[u8],
    ) -> Result<Value, Rejection> {
        if self.contains(kind, id) && !self.config.faults.permissive_duplicates {
            return Err(StatusCode::CONFLICT);
        }
        self.store(kind, id, body)?;
        self.read(kind, id)
    }

    /// Replaces the record addressed by `id`.
    ///
    /// # Errors
    ///
    /// Returns 404 when nothing is stored under `id`, otherwise the same
    /// rejections as [`Store::create`].
    pub fn update(
        &mut self,
        kind: ResourceKind,
        id: u64,
        body: &[u8],
    ) -> Result<Value, Rejection> {
        if !self.contains(kind, id) {
            return Err(StatusCode::NOT_FOUND);
        }
        self.store(kind, id, body)?;
        self.read(kind, id)
    }

    /// Renders the record addressed by `id`.
    ///
    /// # Errors
    ///
    /// Returns 404 when nothing is stored under `id`.
    pub fn read(&self, kind: ResourceKind, id: u64) -> Result<Value, Rejection> {
        match kind {
            ResourceKind::Voter => {
                let mut voter = self.voters.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
                voter.voter_polls = self
                    .votes
                    .values()
                    .filter(|vote| vote.voter_id == voter.id)
                    .map(|vote| VoterPoll {
                        poll_id: vote.poll_id,
                        vote_id: Some(vote.id),
                        voter_id: Some(vote.voter_id),
                        voted_at: None,
                    })
                    .collect();
                let self_link = Link::new(format!("/voters/{id}"));
                voter.envelope.links.set(LinkRelation::SelfLink, self_link);
                to_body(&voter)
            }
            ResourceKind::Poll => {
                let mut poll = self.polls.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
                poll.results = self.live_results(id);
                let links = &mut poll.envelope.links;
                links.set(LinkRelation::SelfLink, Link::new(format!("/polls/{id}")));
                links.set(LinkRelation::Results, Link::new(format!("/polls/{id}/results")));
                links.set(LinkRelation::Votes, Link::new("/votes"));
                links.set(LinkRelation::Voters, Link::new("/voters"));
                to_body(&poll)
            }
            ResourceKind::Vote => {
                let mut vote = self.votes.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
                let poll = vote.poll_id;
                let voter = self.linked_voter(vote.voter_id.get());
                let (results, voter_href) = if self.config.faults.broken_links {
                    (format!("/polls/{poll}/tally"), format!("/voter/{voter}"))
                } else {
                    (format!("/polls/{poll}/results"), format!("/voters/{voter}"))
                };
                let links = &mut vote.envelope.links;
                links.set(LinkRelation::SelfLink, Link::new(format!("/votes/{id}")));
                links.set(LinkRelation::Poll, Link::new(format!("/polls/{poll}")));
                links.set(LinkRelation::Voter, Link::new(voter_href));
                links.set(LinkRelation::Results, Link::new(results));
                to_body(&vote)
            }
        }
    }

    /// Removes the record addressed by `id`.
    ///
    /// # Errors
    ///
    /// Returns 404 when nothing is stored under `id`.
    pub fn delete(&mut self, kind: ResourceKind, id: u64) -> Result<Value, Rejection> {
        if !self.contains(kind, id) {
            return Err(StatusCode::NOT_FOUND);
        }
        if self.config.faults.stale_reads {
            return Ok(Value::Null);
        }
        match kind {
            ResourceKind::Voter => {
                self.voters.remove(&id);
                if self.config.faults.cascading_deletes {
                    self.votes.retain(|_, vote| vote.voter_id.get() != id);
                }
            }
            ResourceKind::Poll => {
                self.polls.remove(&id);
                self.frozen_results.remove(&id);
                if self.config.faults.cascading_deletes {
                    self.votes.retain(|_, vote| vote.poll_id.get() != id);
                }
            }
            ResourceKind::Vote => {
                self.votes.remove(&id);
            }
        }
        Ok(Value::Null)
    }

    /// Renders the aggregated results of poll `id`.
    ///
    /// With lagging aggregates the first answer per poll is replayed forever.
    ///
    /// # Errors
    ///
    /// Returns 404 when the poll does not exist.
    pub fn results(&mut self, id: u64) -> Result<Value, Rejection> {
        if !self.polls.contains_key(&id) {
            return Err(StatusCode::NOT_FOUND);
        }
        let live = self.live_results(id);
        let counts = if self.config.faults.lagging_aggregates {
            self.frozen_results.entry(id).or_insert(live).clone()
        } else {
            live
        };
        let mut results = PollResults {
            results: counts,
            ..PollResults::default()
        };
        let links = &mut results.envelope.links;
        links.set(LinkRelation::SelfLink, Link::new(format!("/polls/{id}/results")));
        links.set(LinkRelation::Poll, Link::new(format!("/polls/{id}")));
        to_body(&results)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn store(&mut self, kind: ResourceKind, id: u64, body: &[u8]) -> Result<(), Rejection> {
        match kind {
            ResourceKind::Voter => {
                let mut voter: Voter = decode(body, id, |voter: &Voter| voter.id.get())?;
                voter.voter_polls.clear();
                voter.envelope = voting_contract::Envelope::default();
                self.voters.insert(id, voter);
            }
            ResourceKind::Poll => {
                let mut poll: Poll = decode(body, id, |poll: &Poll| poll.id.get())?;
                poll.results.clear();
                poll.envelope = voting_contract::Envelope::default();
                if self.config.faults.merge_updates
                    && let Some(existing) = self.polls.get(&id)
                {
                    poll.options = merge_options(&existing.options, poll.options);
                }
                self.polls.insert(id, poll);
            }
            ResourceKind::Vote => {
                let mut vote: Vote = decode(body, id, |vote: &Vote| vote.id.get())?;
                let faults = self.config.faults;
                let poll_known =
                    faults.skip_poll_check || self.polls.contains_key(&vote.poll_id.get());
                let voter_known =
                    faults.skip_voter_check || self.voters.contains_key(&vote.voter_id.get());
                if !(poll_known && voter_known) {
                    return Err(StatusCode::UNPROCESSABLE_ENTITY);
                }
                vote.envelope = voting_contract::Envelope::default();
                self.votes.insert(id, vote);
            }
        }
        Ok(())
    }

    /// Voter id advertised by a vote cast by `voter`.
    fn linked_voter(&self, voter: u64) -> u64 {
        if !self.config.faults.misdirected_voter_links {
            return voter;
        }
        self.voters.keys().rev().copied().find(|id| *id != voter).unwrap_or(voter)
    }

    fn live_results(&self, poll_id: u64) -> Vec<PollResult> {
        let Some(poll) = self.polls.get(&poll_id) else {
            return Vec::new();
        };
        poll.options
            .iter()
            .enumerate()
            .map(|(index, option)| PollResult {
                option_id: option.id,
                vote_count: self.count_votes(poll_id, index, option),
            })
            .collect()
    }

    fn count_votes(&self, poll_id: u64, index: usize, option: &PollOption) -> u64 {
        let selected = match self.config.vote_value {
            VoteValueMode::OptionId => option.id.get(),
            VoteValueMode::OptionIndex => u64::try_from(index).unwrap_or(u64::MAX),
        };
        let count = self
            .votes
            .values()
            .filter(|vote| vote.poll_id.get() == poll_id && vote.vote_value == selected)
            .count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a request body and checks that its id matches the path.
fn decode<T: DeserializeOwned>(
    body: &[u8],
    path_id: u64,
    body_id: impl Fn(&T) -> u64,
) -> Result<T, Rejection> {
    let value: T = serde_json::from_slice(body).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    if body_id(&value) != path_id {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(value)
}

/// Appends `incoming` after the `existing` options.
fn merge_options(existing: &[PollOption], incoming: Vec<PollOption>) -> Vec<PollOption> {
    let mut merged = existing.to_vec();
    merged.extend(incoming);
    merged
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, Rejection> {
    serde_json::to_value(value).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
