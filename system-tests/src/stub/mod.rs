// system-tests/src/stub/mod.rs
// ============================================================================
// Module: Stub Voting Platform
// Description: In-process axum server for the Voters, Polls, and Votes services.
// Purpose: Give end-to-end runs a compliant or deliberately faulty platform.
// Dependencies: axum, tokio, url, voting-harness
// ============================================================================

//! ## Overview
//! One router serves every collection under the shared addressing
//! convention (`/{collection}/{id}`), plus `/{collection}/health` and
//! `/polls/{id}/results`. All handlers share one [`Store`], so the same
//! router can be bound to several ports and still behave as one platform.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use serde_json::Value;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use url::Url;
use voting_contract::ResourceKind;
use voting_harness::HarnessConfig;
use voting_harness::NamespaceMode;
use voting_harness::config::ServiceEndpoints;

pub use store::Faults;
pub use store::Store;
pub use store::StubConfig;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct StubState {
    store: Arc<Mutex<Store>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubState {
    /// Creates state around an empty store.
    #[must_use]
    pub fn new(config: StubConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::new(config))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Runs `op` against the store; a poisoned lock answers 500.
    fn with_store<T>(&self, op: impl FnOnce(&mut Store) -> T) -> Result<T, StatusCode> {
        let mut guard = self.store.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Ok(op(&mut guard))
    }

    fn record(&self, method: &Method, path: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(format!("{method} {path}"));
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Handler state for one collection.
#[derive(Debug, Clone)]
struct Collection {
    state: StubState,
    kind: ResourceKind,
}

impl Collection {
    fn path(&self, id: &str) -> String {
        format!("/{}/{id}", self.kind.collection())
    }
}

/// Builds the platform router over `state`. Unrouted requests are recorded
/// and answered with 404.
pub fn router(state: &StubState) -> Router {
    let app = ResourceKind::ALL.into_iter().fold(Router::new(), |app, kind| {
        app.nest(&format!("/{}", kind.collection()), collection_router(state, kind))
    });
    let unrouted = state.clone();
    app.fallback(move |method: Method, uri: Uri| async move {
        unrouted.record(&method, uri.path());
        StatusCode::NOT_FOUND
    })
}

fn collection_router(state: &StubState, kind: ResourceKind) -> Router {
    let mut routes = Router::new()
        .route("/health", get(health))
        .route("/{id}", get(read).post(create).put(update).delete(delete));
    if kind == ResourceKind::Poll {
        routes = routes.route("/{id}/results", get(results));
    }
    routes.with_state(Collection {
        state: state.clone(),
        kind,
    })
}

fn respond(outcome: Result<Result<Value, StatusCode>, StatusCode>) -> Response {
    match outcome.and_then(|inner| inner) {
        Ok(Value::Null) => StatusCode::OK.into_response(),
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(status) => status.into_response(),
    }
}

/// Parses the id segment; anything else is not found.
fn parse_id(id: &str) -> Result<u64, StatusCode> {
    id.parse::<u64>().map_err(|_| StatusCode::NOT_FOUND)
}

async fn health(State(collection): State<Collection>) -> Response {
    collection.state.record(&Method::GET, &collection.path("health"));
    let status = collection.state.with_store(|store| store.health());
    status.unwrap_or_else(|status| status).into_response()
}

async fn results(State(collection): State<Collection>, Path(id): Path<String>) -> Response {
    collection.state.record(&Method::GET, &format!("{}/results", collection.path(&id)));
    match parse_id(&id) {
        Ok(id) => respond(collection.state.with_store(|store| store.results(id))),
        Err(status) => status.into_response(),
    }
}

async fn read(State(collection): State<Collection>, Path(id): Path<String>) -> Response {
    collection.state.record(&Method::GET, &collection.path(&id));
    let kind = collection.kind;
    match parse_id(&id) {
        Ok(id) => respond(collection.state.with_store(|store| store.read(kind, id))),
        Err(status) => status.into_response(),
    }
}

async fn create(
    State(collection): State<Collection>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    collection.state.record(&Method::POST, &collection.path(&id));
    let kind = collection.kind;
    match parse_id(&id) {
        Ok(id) => respond(collection.state.with_store(|store| store.create(kind, id, &body))),
        Err(status) => status.into_response(),
    }
}

async fn update(
    State(collection): State<Collection>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    collection.state.record(&Method::PUT, &collection.path(&id));
    let kind = collection.kind;
    match parse_id(&id) {
        Ok(id) => respond(collection.state.with_store(|store| store.update(kind, id, &body))),
        Err(status) => status.into_response(),
    }
}

async fn delete(State(collection): State<Collection>, Path(id): Path<String>) -> Response {
    collection.state.record(&Method::DELETE, &collection.path(&id));
    let kind = collection.kind;
    match parse_id(&id) {
        Ok(id) => respond(collection.state.with_store(|store| store.delete(kind, id))),
        Err(status) => status.into_response(),
    }
}

// ============================================================================
// SECTION: In-Process Server
// ============================================================================

/// Handle for a stub platform running on a background thread.
pub struct StubPlatform {
    addr: SocketAddr,
    state: StubState,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubPlatform {
    /// Binds an ephemeral loopback port and serves the platform on it.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be bound.
    pub fn spawn(config: StubConfig) -> Result<Self, String> {
        let listener = StdTcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("stub platform bind failed: {err}"))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| format!("stub platform listener nonblocking failed: {err}"))?;
        let addr =
            listener.local_addr().map_err(|err| format!("stub platform local addr failed: {err}"))?;

        let state = StubState::new(config);
        let app = router(&state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = thread::spawn(move || {
            let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
                return;
            };
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });
        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }

    /// Returns the root URL of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns the three service base URLs on this server.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection URL fails to parse.
    pub fn endpoints(&self) -> Result<ServiceEndpoints, String> {
        let url = |collection: &str| {
            Url::parse(&format!("{}/{collection}", self.base_url()))
                .map_err(|err| format!("stub url invalid: {err}"))
        };
        Ok(ServiceEndpoints {
            voters: url("voters")?,
            polls: url("polls")?,
            votes: url("votes")?,
        })
    }

    /// Returns the default harness configuration pointed at this server with
    /// fixed ids. Every other setting, vote value mode included, keeps its
    /// default.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints or defaults fail to build.
    pub fn harness_config(&self) -> Result<HarnessConfig, String> {
        let mut config = HarnessConfig::defaults().map_err(|err| err.to_string())?;
        config.endpoints = self.endpoints()?;
        config.namespace = NamespaceMode::Fixed;
        Ok(config)
    }

    /// Returns every request served so far as `METHOD /path`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns the number of records still stored.
    #[must_use]
    pub fn stored(&self) -> usize {
        self.state.with_store(|store| store.len()).unwrap_or_default()
    }

    /// Returns true when a record of `kind` with `id` is stored.
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, id: u64) -> bool {
        self.state.with_store(|store| store.contains(kind, id)).unwrap_or_default()
    }
}

impl Drop for StubPlatform {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
