//! Live loop state owned by the scheduler
//!
//! `LoopState` is the control state; `SessionState` is what one live
//! session has observed. Both are only mutated through `LiveLoop` methods.

use moodlens_common::events::LoopPhase;
use moodlens_common::MoodLabel;
use serde::Serialize;
use uuid::Uuid;

use super::timer::LiveTimer;
use crate::inference::{Prediction, ProbabilityEntry};
use crate::settings::LiveSettings;
use crate::smoothing::SmoothingWindow;
use crate::trail::{TrailEntry, TrailRecorder};

/// Probability rows shown in the status view
pub const TOP_PROBABILITIES: usize = 3;

/// Control state of the loop
#[derive(Debug)]
pub(crate) struct LoopState {
    pub enabled: bool,
    pub in_flight: bool,
    pub phase: LoopPhase,
    /// Bumped on every start and stop; results tagged with an older
    /// generation are discarded
    pub generation: u64,
    pub session_id: Uuid,
    pub settings: LiveSettings,
    pub timer: LiveTimer,
}

impl LoopState {
    pub fn new(settings: LiveSettings) -> Self {
        Self {
            enabled: false,
            in_flight: false,
            phase: LoopPhase::Idle,
            generation: 0,
            session_id: Uuid::nil(),
            settings,
            timer: LiveTimer::new(),
        }
    }

    /// True if a result dispatched under `generation` may still be applied
    pub fn accepts(&self, generation: u64) -> bool {
        self.enabled && self.generation == generation
    }
}

/// What the current session has observed
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub window: SmoothingWindow,
    pub trail: TrailRecorder,
    pub last_prediction: Option<Prediction>,
    pub pending_mood: Option<MoodLabel>,
    pub error_message: Option<String>,
    pub latency_ms: Option<u64>,
}

impl SessionState {
    pub fn reset(&mut self) {
        self.window.clear();
        self.trail.clear();
        self.last_prediction = None;
        self.pending_mood = None;
        self.error_message = None;
        self.latency_ms = None;
    }
}

/// Indicator shown next to the camera feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    Paused,
    Live,
    Analyzing,
}

/// Read-only snapshot of the loop for status endpoints and tests
#[derive(Debug, Clone, Serialize)]
pub struct LiveStatus {
    pub session_id: Uuid,
    pub phase: LoopPhase,
    pub status: StatusLabel,
    pub enabled: bool,
    pub in_flight: bool,
    pub timer_armed: bool,
    pub generation: u64,
    pub settings: LiveSettings,
    pub last_prediction: Option<Prediction>,
    pub top_probabilities: Vec<ProbabilityEntry>,
    pub pending_mood: Option<MoodLabel>,
    pub error_message: Option<String>,
    pub latency_ms: Option<u64>,
    /// Newest first
    pub trail: Vec<TrailEntry>,
    pub window: Vec<MoodLabel>,
}

impl LiveStatus {
    pub(crate) fn capture(state: &LoopState, session: &SessionState) -> Self {
        let status = match (state.enabled, state.in_flight) {
            (false, _) => StatusLabel::Paused,
            (true, true) => StatusLabel::Analyzing,
            (true, false) => StatusLabel::Live,
        };

        Self {
            session_id: state.session_id,
            phase: state.phase,
            status,
            enabled: state.enabled,
            in_flight: state.in_flight,
            timer_armed: state.timer.is_armed(),
            generation: state.generation,
            settings: state.settings,
            last_prediction: session.last_prediction.clone(),
            top_probabilities: session
                .last_prediction
                .as_ref()
                .map(|p| p.top_probabilities(TOP_PROBABILITIES))
                .unwrap_or_default(),
            pending_mood: session.pending_mood.clone(),
            error_message: session.error_message.clone(),
            latency_ms: session.latency_ms,
            trail: session.trail.newest_first(),
            window: session.window.labels().cloned().collect(),
        }
    }

    /// Confidence of the last prediction as a whole percentage
    pub fn confidence_pct(&self) -> u8 {
        self.last_prediction
            .as_ref()
            .map(|p| (p.confidence.clamp(0.0, 1.0) * 100.0).round() as u8)
            .unwrap_or(0)
    }
}
