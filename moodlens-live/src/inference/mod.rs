//! Classifier integration
//!
//! - `types.rs`: prediction model and response schema validation
//! - `client.rs`: `Classifier` trait and the HTTP multipart client

mod client;
mod types;

pub use client::{Classifier, HttpClassifier};
pub use types::{interpret_response, Prediction, ProbabilityEntry};

/// Which classifier endpoint an exchange targets
///
/// Both share the request shape and success contract; they differ in the
/// upload file name, the strictness of the body schema, and the fallback
/// messages shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Continuous analysis used by the live loop
    Live,
    /// One-shot capture action
    Snapshot,
}

impl Endpoint {
    /// File name of the multipart `snapshot` part
    pub fn file_name(&self) -> &'static str {
        match self {
            Endpoint::Live => "live-frame.jpg",
            Endpoint::Snapshot => "snapshot.jpg",
        }
    }

    /// Live results drive cadence and gating and so must carry a confidence
    pub fn requires_confidence(&self) -> bool {
        matches!(self, Endpoint::Live)
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Live => "Error analyzing live frame.",
            Endpoint::Snapshot => "Error processing snapshot on the server.",
        }
    }

    pub fn network_message(&self) -> &'static str {
        match self {
            Endpoint::Live => "Network error while analyzing live frame.",
            Endpoint::Snapshot => "Error sending snapshot to the server.",
        }
    }
}
