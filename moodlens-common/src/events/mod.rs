//! Event types for the moodlens event system
//!
//! Provides shared event definitions and the EventBus used to fan live-loop
//! activity out to SSE clients and the recommendation consumer.

mod live_types;

pub use live_types::{CommitSource, FailureKind, LoopPhase};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::mood::MoodLabel;

/// Moodlens event types
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MoodEvent {
    /// Live loop lifecycle changed (start, stop, fatal stop)
    ///
    /// Triggers:
    /// - SSE: Update Live/Paused indicator
    LoopStateChanged {
        /// Session the transition belongs to
        session_id: Uuid,
        /// Phase before the change
        old_phase: LoopPhase,
        /// Phase after the change
        new_phase: LoopPhase,
        /// When the phase changed
        timestamp: DateTime<Utc>,
    },

    /// A classifier result was applied to the live session
    ///
    /// Triggers:
    /// - SSE: Update confidence ring, probability bars, trail
    PredictionUpdated {
        session_id: Uuid,
        /// Raw label of this frame
        label: MoodLabel,
        /// Raw confidence of this frame (0.0-1.0)
        confidence: f64,
        /// Candidate after smoothing (the pending mood)
        candidate: MoodLabel,
        /// Loop generation the result was dispatched under
        generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// A mood was handed to the recommendation consumer
    ///
    /// Triggers:
    /// - Song list: refresh recommendations for `genre`
    MoodCommitted {
        mood: MoodLabel,
        /// Catalogue genre bucket for `mood`
        genre: String,
        source: CommitSource,
        timestamp: DateTime<Utc>,
    },

    /// An inference cycle failed
    ///
    /// Triggers:
    /// - SSE: Show the error message
    CycleFailed {
        session_id: Uuid,
        kind: FailureKind,
        /// User-visible message
        message: String,
        /// True if the failure stopped the loop
        fatal: bool,
        timestamp: DateTime<Utc>,
    },
}

impl MoodEvent {
    /// SSE event name for this variant
    pub fn event_name(&self) -> &'static str {
        match self {
            MoodEvent::LoopStateChanged { .. } => "loop_state_changed",
            MoodEvent::PredictionUpdated { .. } => "prediction_updated",
            MoodEvent::MoodCommitted { .. } => "mood_committed",
            MoodEvent::CycleFailed { .. } => "cycle_failed",
        }
    }
}

/// Central event distribution bus
///
/// Thin wrapper around a tokio broadcast channel. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MoodEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers drop old events
    ///
    /// # Examples
    ///
    /// ```
    /// use moodlens_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// let _rx = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<MoodEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: MoodEvent) -> Result<usize, broadcast::error::SendError<MoodEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MoodEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live receivers (SSE clients plus in-process listeners)
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
