//! Error types for moodlens-live
//!
//! Three layers:
//! - [`CycleError`]: why a single inference cycle failed. Contained within
//!   the cycle; only the fatal kind stops the loop.
//! - [`LoopError`]: misuse of a loop control operation.
//! - [`ApiError`]: HTTP-facing errors rendered as JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moodlens_common::events::FailureKind;
use serde_json::json;
use thiserror::Error;

use crate::inference::Endpoint;

/// Outcome of a failed capture → classify exchange
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CycleError {
    /// Capture source produced no frame
    #[error("No frame available from capture source")]
    CaptureUnavailable,

    /// 2xx response whose body does not match the prediction schema
    #[error("Malformed classifier response: {detail}")]
    MalformedResponse {
        /// `error` field of the body, if the service sent one
        message: Option<String>,
        /// What was wrong with the body
        detail: String,
    },

    /// Non-2xx status the loop retries at degraded cadence
    #[error("Classifier error {status}")]
    TransientService { status: u16, message: Option<String> },

    /// Status >= 500 or 403: overload or access revocation
    #[error("Classifier unavailable {status}")]
    FatalService { status: u16, message: Option<String> },

    /// No response at all (connect failure, reset, timeout)
    #[error("Network error: {0}")]
    Network(String),
}

impl CycleError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CycleError::CaptureUnavailable => FailureKind::CaptureUnavailable,
            CycleError::MalformedResponse { .. } => FailureKind::MalformedResponse,
            CycleError::TransientService { .. } => FailureKind::TransientService,
            CycleError::FatalService { .. } => FailureKind::FatalService,
            CycleError::Network(_) => FailureKind::Network,
        }
    }

    /// True if the live loop must stop instead of retrying
    pub fn is_fatal(&self) -> bool {
        matches!(self, CycleError::FatalService { .. })
    }

    /// Message to show the user for a failure on `endpoint`
    ///
    /// Service-provided `error` text wins over the fixed fallbacks.
    pub fn user_message(&self, endpoint: Endpoint) -> String {
        match self {
            CycleError::CaptureUnavailable => {
                "Unable to capture image. Please allow camera access.".to_string()
            }
            CycleError::MalformedResponse { message, .. }
            | CycleError::TransientService { message, .. }
            | CycleError::FatalService { message, .. } => message
                .clone()
                .unwrap_or_else(|| endpoint.fallback_message().to_string()),
            CycleError::Network(_) => endpoint.network_message().to_string(),
        }
    }
}

/// Classify a non-2xx classifier status
pub fn classify_status(status: u16, message: Option<String>) -> CycleError {
    if status >= 500 || status == 403 {
        CycleError::FatalService { status, message }
    } else {
        CycleError::TransientService { status, message }
    }
}

/// Live loop control errors
#[derive(Debug, Error, PartialEq)]
pub enum LoopError {
    /// `start()` while the loop is already enabled
    #[error("Live loop is already running")]
    AlreadyRunning,

    /// Rejected cadence/gating settings
    #[error("Invalid live settings: {0}")]
    InvalidSettings(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., live loop already running
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Capture device unavailable (503)
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Classifier failed or misbehaved (502)
    #[error("Classifier error: {0}")]
    Upstream(String),
}

impl From<LoopError> for ApiError {
    fn from(err: LoopError) -> Self {
        match err {
            LoopError::AlreadyRunning => ApiError::Conflict(err.to_string()),
            LoopError::InvalidSettings(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::CaptureUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CAPTURE_UNAVAILABLE",
                msg,
            ),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "CLASSIFIER_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
