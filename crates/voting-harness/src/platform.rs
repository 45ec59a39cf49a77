// crates/voting-harness/src/platform.rs
// ============================================================================
// Module: Platform Clients
// Description: Typed per-service clients over the shared requester.
// Purpose: Apply the `{base}/{id}` addressing convention and link resolution.
// Dependencies: serde_json, url, voting-contract
// ============================================================================

//! ## Overview
//! A [`ResourceClient`] addresses one service: `POST`/`GET`/`PUT`/`DELETE`
//! on `{base}/{id}`, `GET {base}/health`, and `GET` of hypermedia hrefs
//! resolved against the service base. [`Platform`] bundles the three clients
//! around one [`Requester`] so the run has a single transcript.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use url::Url;
use voting_contract::Resource;
use voting_contract::ResourceKind;

use crate::config::ServiceEndpoints;
use crate::requester::HttpMethod;
use crate::requester::RawResponse;
use crate::requester::RequestError;
use crate::requester::Requester;

// ============================================================================
// SECTION: Resource Client
// ============================================================================

/// Client for one resource service.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    kind: ResourceKind,
    base: Url,
    requester: Requester,
}

impl ResourceClient {
    /// Creates a client for `kind` rooted at `base`.
    #[must_use]
    pub const fn new(kind: ResourceKind, base: Url, requester: Requester) -> Self {
        Self {
            kind,
            base,
            requester,
        }
    }

    /// Returns the resource kind served.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Returns `{base}/{segment}`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] when the joined URL does not parse.
    pub fn item_url(&self, segment: &str) -> Result<Url, RequestError> {
        let raw = format!("{}/{segment}", self.base.as_str().trim_end_matches('/'));
        Url::parse(&raw).map_err(|err| RequestError::InvalidUrl {
            url: raw,
            reason: err.to_string(),
        })
    }

    /// Resolves a hypermedia href: absolute hrefs are used as-is, relative
    /// ones are joined onto the service base.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] for empty or unparsable hrefs.
    pub fn resolve(&self, href: &str) -> Result<Url, RequestError> {
        let invalid = |reason: String| RequestError::InvalidUrl {
            url: href.to_string(),
            reason,
        };
        if href.trim().is_empty() {
            return Err(invalid("empty href".to_string()));
        }
        self.base.join(href.trim()).map_err(|err| invalid(err.to_string()))
    }

    /// `POST {base}/{id}` with the resource as body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on encoding or transport failure.
    pub async fn create<R: Resource>(&self, resource: &R) -> Result<RawResponse, RequestError> {
        self.send_resource(HttpMethod::Post, resource).await
    }

    /// `GET {base}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure.
    pub async fn read(&self, id: u64) -> Result<RawResponse, RequestError> {
        let url = self.item_url(&id.to_string())?;
        self.requester.send(HttpMethod::Get, &url, None).await
    }

    /// `PUT {base}/{id}` with the resource as body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on encoding or transport failure.
    pub async fn update<R: Resource>(&self, resource: &R) -> Result<RawResponse, RequestError> {
        self.send_resource(HttpMethod::Put, resource).await
    }

    /// `DELETE {base}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure.
    pub async fn delete(&self, id: u64) -> Result<RawResponse, RequestError> {
        let url = self.item_url(&id.to_string())?;
        self.requester.send(HttpMethod::Delete, &url, None).await
    }

    /// `GET` of a hypermedia href.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] for unresolvable hrefs or transport failure.
    pub async fn follow(&self, href: &str) -> Result<RawResponse, RequestError> {
        let url = self.resolve(href)?;
        self.requester.send(HttpMethod::Get, &url, None).await
    }

    /// `GET {base}/health`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure.
    pub async fn health(&self) -> Result<RawResponse, RequestError> {
        let url = self.item_url("health")?;
        self.requester.send(HttpMethod::Get, &url, None).await
    }

    async fn send_resource<R: Resource>(
        &self,
        method: HttpMethod,
        resource: &R,
    ) -> Result<RawResponse, RequestError> {
        let url = self.item_url(&resource.raw_id().to_string())?;
        let body: Value = serde_json::to_value(resource).map_err(|err| RequestError::Encode {
            reason: err.to_string(),
        })?;
        self.requester.send(method, &url, Some(&body)).await
    }
}

// ============================================================================
// SECTION: Platform
// ============================================================================

/// The three service clients sharing one requester.
#[derive(Debug, Clone)]
pub struct Platform {
    voters: ResourceClient,
    polls: ResourceClient,
    votes: ResourceClient,
    requester: Requester,
}

impl Platform {
    /// Builds the clients for `endpoints`.
    #[must_use]
    pub fn new(endpoints: &ServiceEndpoints, requester: Requester) -> Self {
        let client = |kind: ResourceKind| {
            ResourceClient::new(kind, endpoints.for_kind(kind).clone(), requester.clone())
        };
        Self {
            voters: client(ResourceKind::Voter),
            polls: client(ResourceKind::Poll),
            votes: client(ResourceKind::Vote),
            requester,
        }
    }

    /// Returns the client serving `kind`.
    #[must_use]
    pub const fn client(&self, kind: ResourceKind) -> &ResourceClient {
        match kind {
            ResourceKind::Voter => &self.voters,
            ResourceKind::Poll => &self.polls,
            ResourceKind::Vote => &self.votes,
        }
    }

    /// Voters service client.
    #[must_use]
    pub const fn voters(&self) -> &ResourceClient {
        &self.voters
    }

    /// Polls service client.
    #[must_use]
    pub const fn polls(&self) -> &ResourceClient {
        &self.polls
    }

    /// Votes service client.
    #[must_use]
    pub const fn votes(&self) -> &ResourceClient {
        &self.votes
    }

    /// Shared requester, for transcript access.
    #[must_use]
    pub const fn requester(&self) -> &Requester {
        &self.requester
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
