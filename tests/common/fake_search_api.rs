//! Fake suggestion API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves `GET /suggest?q=<term>` in the OpenSearch suggestion
//! shape: `[term, [matches...]]`, where matches are the configured entries
//! that start with the term (case-insensitive).
//!
//! Individual terms can be slowed down or made to fail with a status code,
//! and every request is recorded so tests can assert what the pipeline
//! actually sent.
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeSearchApi::start(&["react", "redux"]).await.unwrap();
//! api.delay("re", Duration::from_millis(200)).await;
//! api.fail("rx", 503).await;
//! let backend = HttpBackend::new(&api.suggest_url()).unwrap();
//! ```

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct ApiState {
    entries: Vec<String>,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, u16>,
    /// Every `q` received, in arrival order.
    requests: Vec<String>,
}

/// Handle to the running fake suggestion server.
pub struct FakeSearchApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeSearchApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start(entries: &[&str]) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            entries: entries.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/suggest", get(suggest))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Full suggestion endpoint, e.g. `http://127.0.0.1:PORT/suggest`.
    pub fn suggest_url(&self) -> String {
        format!("http://{}/suggest", self.addr)
    }

    /// Hold responses for `term` for `delay` before answering.
    pub async fn delay(&self, term: &str, delay: Duration) {
        self.state.lock().await.delays.insert(term.to_string(), delay);
    }

    /// Answer `term` with an empty body and `status`.
    pub async fn fail(&self, term: &str, status: u16) {
        self.state.lock().await.failures.insert(term.to_string(), status);
    }

    /// Terms requested so far, in arrival order.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn suggest(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> Response {
    let term = params.get("q").cloned().unwrap_or_default();

    let (delay, failure, matches) = {
        let mut state = state.lock().await;
        state.requests.push(term.clone());
        let needle = term.to_lowercase();
        let matches: Vec<String> = state
            .entries
            .iter()
            .filter(|e| e.to_lowercase().starts_with(&needle))
            .cloned()
            .collect();
        (
            state.delays.get(&term).copied(),
            state.failures.get(&term).copied(),
            matches,
        )
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return status.into_response();
    }

    Json(json!([term, matches])).into_response()
}
