//! Live-loop type definitions
//!
//! Supporting types carried by live-loop events and status views.

use serde::{Deserialize, Serialize};

/// Coarse lifecycle phase of the live loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum LoopPhase {
    /// Never started in this process
    Idle,
    /// Enabled: either waiting for the next tick or running a cycle
    Running,
    /// Stopped by the user or by a fatal classifier failure
    Stopped,
}

impl std::fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopPhase::Idle => write!(f, "Idle"),
            LoopPhase::Running => write!(f, "Running"),
            LoopPhase::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Which path committed a mood to the recommendation consumer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommitSource {
    /// Confidence gate passed during the live loop
    Auto,
    /// User confirmed the pending candidate
    Manual,
    /// One-shot snapshot capture
    Snapshot,
}

/// Category of a failed inference cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No frame could be obtained from the capture source
    CaptureUnavailable,
    /// Success status but the body had no usable label
    MalformedResponse,
    /// Non-2xx status the loop retries
    TransientService,
    /// Overload or access revocation; halts the loop
    FatalService,
    /// No response at all (connect error, reset, timeout)
    Network,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::CaptureUnavailable => "capture_unavailable",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::TransientService => "transient_service",
            FailureKind::FatalService => "fatal_service",
            FailureKind::Network => "network",
        }
    }
}
