//! Browser front end for codemender.
//!
//! A small axum server exposing the retry loop to a single-page UI: task
//! input, an attempt-count slider, and two result panes (console output and
//! generated code). Progress events stream over SSE while a run is in
//! flight.

mod page;
mod sse;
mod state;

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::agents::{FinalResult, LoopConfig, LoopController};
use crate::config::AppConfig;

pub use state::AppState;

/// Attempt-budget bounds enforced for browser submissions.
const MIN_ATTEMPTS: u32 = 1;
const MAX_ATTEMPTS: u32 = 5;

/// Request body for `POST /api/run`.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Natural-language task description.
    pub task: String,
    /// Requested attempt budget; clamped to the slider range.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
}

fn default_attempts() -> u32 {
    3
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/run", post(run_handler))
        .route("/events", get(sse::events_handler))
        .layer(cors)
        .with_state(state)
}

/// Starts the server and blocks until shutdown.
pub async fn serve(config: AppConfig, bind: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(config);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serves the embedded single-page UI.
async fn index_handler() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

/// Runs one task submission, forwarding progress to SSE subscribers.
async fn run_handler(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<FinalResult>, (StatusCode, String)> {
    let task = request.task.trim().to_string();
    if task.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "task must not be empty".to_string()));
    }

    let max_attempts = request.max_attempts.clamp(MIN_ATTEMPTS, MAX_ATTEMPTS);
    let controller =
        LoopController::from_app_config(state.config(), LoopConfig::new().with_max_attempts(max_attempts));

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(64);
    let broadcast_tx = state.events().clone();
    let forwarder = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            // Lossy by design: SSE subscribers are observers only
            let _ = broadcast_tx.send(event);
        }
    });

    let result = controller.run(&task, max_attempts, event_tx).await;
    let _ = forwarder.await;

    result
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}
