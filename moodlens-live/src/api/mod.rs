//! HTTP control surface
//!
//! Routes:
//! - `GET  /health`
//! - `GET  /live/status`
//! - `POST /live/start`, `/live/stop`, `/live/restart`
//! - `PUT  /live/settings`
//! - `POST /mood/apply`
//! - `POST /snapshot`
//! - `GET  /events` (SSE)

pub mod handlers;
pub mod sse;

use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use moodlens_common::events::EventBus;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::scheduler::LiveLoop;
use crate::snapshot::SnapshotCapture;

/// Shared state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub live: LiveLoop,
    pub snapshot: Arc<SnapshotCapture>,
    pub events: EventBus,
    pub startup_time: DateTime<Utc>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Live loop control
        .route("/live/status", get(handlers::get_status))
        .route("/live/start", post(handlers::start_live))
        .route("/live/stop", post(handlers::stop_live))
        .route("/live/restart", post(handlers::restart_live))
        .route("/live/settings", put(handlers::update_settings))
        // Mood commits
        .route("/mood/apply", post(handlers::apply_mood))
        .route("/snapshot", post(handlers::take_snapshot))
        // SSE event stream
        .route("/events", get(sse::event_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
