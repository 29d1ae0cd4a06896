//! HTTP request handlers

use axum::{extract::State, Json};
use moodlens_common::MoodLabel;
use serde::Serialize;
use tracing::info;

use super::AppState;
use crate::error::{ApiError, ApiResult, CycleError};
use crate::scheduler::LiveStatus;
use crate::settings::{LiveSettings, LiveSettingsUpdate};
use crate::snapshot::SnapshotError;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    uptime_seconds: i64,
    live_running: bool,
    event_subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    applied: bool,
    mood: Option<MoodLabel>,
    genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    mood: MoodLabel,
    genre: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "moodlens-live".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (chrono::Utc::now() - state.startup_time).num_seconds(),
        live_running: state.live.is_running(),
        event_subscribers: state.events.subscriber_count(),
    })
}

/// GET /live/status
pub async fn get_status(State(state): State<AppState>) -> Json<LiveStatus> {
    Json(state.live.status())
}

/// POST /live/start
///
/// Responds after the first cycle completes. 409 if already running.
pub async fn start_live(State(state): State<AppState>) -> ApiResult<Json<LiveStatus>> {
    info!("Start requested");
    state.live.start().await?;
    Ok(Json(state.live.status()))
}

/// POST /live/stop
pub async fn stop_live(State(state): State<AppState>) -> Json<LiveStatus> {
    info!("Stop requested");
    state.live.stop();
    Json(state.live.status())
}

/// POST /live/restart
pub async fn restart_live(State(state): State<AppState>) -> ApiResult<Json<LiveStatus>> {
    info!("Restart requested");
    state.live.restart().await?;
    Ok(Json(state.live.status()))
}

/// PUT /live/settings
///
/// Partial update; omitted fields keep their value. 400 on out-of-range values.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<LiveSettingsUpdate>,
) -> ApiResult<Json<LiveSettings>> {
    let settings = state.live.update_settings(&update)?;
    Ok(Json(settings))
}

/// POST /mood/apply
///
/// Commit the pending candidate. `applied: false` when nothing is pending.
pub async fn apply_mood(State(state): State<AppState>) -> Json<ApplyResponse> {
    match state.live.apply_pending() {
        Some(mood) => Json(ApplyResponse {
            applied: true,
            genre: Some(mood.genre()),
            mood: Some(mood),
        }),
        None => Json(ApplyResponse {
            applied: false,
            mood: None,
            genre: None,
        }),
    }
}

/// POST /snapshot
pub async fn take_snapshot(State(state): State<AppState>) -> ApiResult<Json<SnapshotResponse>> {
    let outcome = state.snapshot.capture_once().await;

    match outcome {
        Ok(mood) => {
            state.live.record_snapshot(Ok(&mood));
            Ok(Json(SnapshotResponse {
                genre: mood.genre(),
                mood,
            }))
        }
        Err(SnapshotError::Busy) => Err(ApiError::Conflict(SnapshotError::Busy.to_string())),
        Err(SnapshotError::Failed(err)) => {
            state.live.record_snapshot(Err(&err));
            let message = err.user_message(crate::inference::Endpoint::Snapshot);
            Err(match err {
                CycleError::CaptureUnavailable => ApiError::CaptureUnavailable(message),
                _ => ApiError::Upstream(message),
            })
        }
    }
}
