// crates/voting-harness/src/requester.rs
// ============================================================================
// Module: HTTP Requester
// Description: Single verb-dispatch point for every harness HTTP call.
// Purpose: Return raw status and body, record a transcript, never retry.
// Dependencies: reqwest, serde_json, thiserror, tracing, url
// ============================================================================

//! ## Overview
//! Every call the harness makes goes through [`Requester::send`]. The verb is
//! a closed [`HttpMethod`]; the string entry point [`Requester::dispatch`]
//! rejects anything outside `GET`, `POST`, `PUT`, `DELETE` with
//! [`RequestError::UnsupportedMethod`] before touching the network.
//! Invariants:
//! - Any HTTP status is a successful exchange; interpreting it is the caller's job.
//! - Transport failures are returned once, without retry or backoff.
//! - Each exchange that reaches the network appends one transcript entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Methods
// ============================================================================

/// HTTP verbs the harness issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Every supported verb.
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Returns the wire verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    const fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RequestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|method| method.as_str() == raw).ok_or_else(|| {
            RequestError::UnsupportedMethod {
                verb: raw.to_string(),
            }
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Requester failures. All of them are fatal to a harness run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Verb outside the supported set.
    #[error("unsupported http method \"{verb}\"")]
    UnsupportedMethod {
        /// Rejected verb.
        verb: String,
    },
    /// HTTP client could not be constructed.
    #[error("failed to build http client: {reason}")]
    Client {
        /// Builder failure.
        reason: String,
    },
    /// Target URL could not be built.
    #[error("invalid request url \"{url}\": {reason}")]
    InvalidUrl {
        /// Offending URL or href.
        url: String,
        /// Parse failure.
        reason: String,
    },
    /// Request body could not be encoded.
    #[error("failed to encode request body: {reason}")]
    Encode {
        /// Encoder failure.
        reason: String,
    },
    /// Network-level failure: connect, timeout, or body read.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// Request verb.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Underlying failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Raw status and body of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Returns true for the one status the services use for success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// 1-based position in the run.
    pub sequence: u64,
    /// Request verb.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request body, if any.
    pub request: Option<Value>,
    /// Response status, absent on transport failure.
    pub status: Option<u16>,
    /// Response body; JSON when it parses, otherwise the raw text.
    pub response: Option<Value>,
    /// Transport failure, if any.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Requester
// ============================================================================

/// Shared HTTP requester with transcript capture.
#[derive(Debug, Clone)]
pub struct Requester {
    client: Client,
    timeout: Duration,
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl Requester {
    /// Builds a requester whose calls each time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Client`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, RequestError> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            RequestError::Client {
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            client,
            timeout,
            transcript: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parses `verb` and sends the request.
    ///
    /// Entry point for callers that hold the verb as text. Verbs outside
    /// [`HttpMethod`] are refused before anything reaches the network.
    /// Resource clients call [`Requester::send`] with a typed method instead.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnsupportedMethod`] for unknown verbs and
    /// [`RequestError::Transport`] for network failures.
    pub async fn dispatch(
        &self,
        verb: &str,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<RawResponse, RequestError> {
        let method: HttpMethod = verb.parse()?;
        self.send(method, url, body).await
    }

    /// Sends one request and returns the raw status and body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Transport`] when no HTTP response is received.
    pub async fn send(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<RawResponse, RequestError> {
        let mut request = self.client.request(method.to_reqwest(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let outcome = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                response.text().await.map(|body| RawResponse {
                    status,
                    body,
                })
            }
            Err(err) => Err(err),
        };
        match outcome {
            Ok(response) => {
                tracing::debug!(%method, %url, status = response.status, "http exchange");
                self.record(method, url, body, Some(&response), None);
                Ok(response)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::debug!(%method, %url, error = %reason, "http transport failure");
                self.record(method, url, body, None, Some(reason.clone()));
                Err(RequestError::Transport {
                    method,
                    url: url.to_string(),
                    reason,
                })
            }
        }
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    fn record(
        &self,
        method: HttpMethod,
        url: &Url,
        request: Option<&Value>,
        response: Option<&RawResponse>,
        error: Option<String>,
    ) {
        let Ok(mut guard) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method,
            url: url.to_string(),
            request: request.cloned(),
            status: response.map(|response| response.status),
            response: response.map(|response| {
                serde_json::from_str(&response.body)
                    .unwrap_or_else(|_| Value::String(response.body.clone()))
            }),
            error,
        });
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
