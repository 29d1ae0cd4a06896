//! Live loop scheduler
//!
//! Drives capture → inference → trail/smoothing → gate → re-arm.
//!
//! **Module Structure:**
//! - `timer.rs`: re-armable single-shot timer (`arm` / `cancel`)
//! - `state.rs`: `LoopState`, `SessionState`, `LiveStatus` view
//!
//! **Guarantees:**
//! - At most one classifier call per generation is outstanding: a tick
//!   that finds `in_flight` set is dropped, not queued.
//! - Each cycle runs in its own task. `start()`/`tick()` only await it, so
//!   a caller that gives up (e.g. a disconnected HTTP client) leaves the
//!   cycle to finish, clear `in_flight` and re-arm.
//! - No timer is armed while the loop is disabled.
//! - `stop()` does not abort a dispatched call. Every call is tagged with
//!   the generation it was dispatched under; once `stop()`/`start()` bump
//!   the generation, a late result is discarded without touching session
//!   state or the consumer.
//! - A fatal classifier failure (status >= 500 or 403) stops the loop;
//!   only an explicit `start()`/`restart()` resumes it.

mod state;
mod timer;

pub use state::{LiveStatus, StatusLabel, TOP_PROBABILITIES};
pub use timer::LiveTimer;

use moodlens_common::events::{CommitSource, EventBus, LoopPhase, MoodEvent};
use moodlens_common::time::{elapsed_millis, now};
use moodlens_common::MoodLabel;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use self::state::{LoopState, SessionState};
use crate::cadence::next_delay;
use crate::capture::FrameSource;
use crate::consumer::MoodConsumer;
use crate::error::{CycleError, LoopError};
use crate::gate::ConfidenceGate;
use crate::inference::{Classifier, Endpoint, Prediction};
use crate::settings::{LiveSettings, LiveSettingsUpdate};

/// External collaborators of the live loop
pub struct LiveLoopDeps {
    pub frames: Arc<dyn FrameSource>,
    pub classifier: Arc<dyn Classifier>,
    pub consumer: Arc<dyn MoodConsumer>,
    pub events: EventBus,
}

struct Core {
    state: LoopState,
    session: SessionState,
}

struct Inner {
    frames: Arc<dyn FrameSource>,
    classifier: Arc<dyn Classifier>,
    consumer: Arc<dyn MoodConsumer>,
    events: EventBus,
    request_timeout: Duration,
    // Never held across an await
    core: Mutex<Core>,
}

/// Handle to the live loop; clones share one loop
#[derive(Clone)]
pub struct LiveLoop {
    inner: Arc<Inner>,
}

impl LiveLoop {
    pub fn new(deps: LiveLoopDeps, settings: LiveSettings, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                frames: deps.frames,
                classifier: deps.classifier,
                consumer: deps.consumer,
                events: deps.events,
                request_timeout,
                core: Mutex::new(Core {
                    state: LoopState::new(settings),
                    session: SessionState::default(),
                }),
            }),
        }
    }

    /// Start a new session and run its first cycle immediately
    ///
    /// Returns once the first cycle has completed (or been dropped). The
    /// cycle itself keeps running if this future is dropped early.
    ///
    /// # Errors
    /// [`LoopError::AlreadyRunning`] if the loop is enabled
    pub async fn start(&self) -> Result<(), LoopError> {
        {
            let mut core = self.inner.core.lock();
            let Core { state, session } = &mut *core;
            if state.enabled {
                return Err(LoopError::AlreadyRunning);
            }

            session.reset();
            state.generation += 1;
            state.enabled = true;
            state.in_flight = false;
            state.session_id = Uuid::new_v4();
            let old_phase = std::mem::replace(&mut state.phase, LoopPhase::Running);

            info!(
                session_id = %state.session_id,
                generation = state.generation,
                base_interval_ms = state.settings.base_interval_ms,
                adaptive = state.settings.adaptive,
                "Live loop started"
            );
            self.emit_phase_change(state.session_id, old_phase, LoopPhase::Running);
        }

        self.tick().await;
        Ok(())
    }

    /// Stop the loop; idempotent
    ///
    /// Cancels the pending timer and clears the in-flight guard without
    /// waiting for an outstanding call.
    pub fn stop(&self) {
        let mut core = self.inner.core.lock();
        self.halt(&mut core.state, "stopped by caller");
    }

    /// `stop()` followed by `start()`
    pub async fn restart(&self) -> Result<(), LoopError> {
        self.stop();
        self.start().await
    }

    /// Run one inference cycle now
    ///
    /// No-op when the loop is disabled or a call is already in flight.
    pub async fn tick(&self) {
        self.tick_if_current(None).await;
    }

    /// Commit the pending candidate to the consumer
    ///
    /// Returns the committed mood, or `None` if nothing is pending.
    pub fn apply_pending(&self) -> Option<MoodLabel> {
        let pending = self
            .inner
            .core
            .lock()
            .session
            .pending_mood
            .clone()
            .filter(|m| !m.is_blank())?;

        self.inner.consumer.commit(&pending, CommitSource::Manual);
        Some(pending)
    }

    /// Fold a one-shot snapshot outcome into the session view
    pub fn record_snapshot(&self, outcome: Result<&MoodLabel, &CycleError>) {
        let mut core = self.inner.core.lock();
        match outcome {
            Ok(label) => {
                core.session.pending_mood = Some(label.clone());
                core.session.error_message = None;
            }
            Err(err) => {
                core.session.error_message = Some(err.user_message(Endpoint::Snapshot));
            }
        }
    }

    /// Apply a partial settings change; takes effect from the next cycle
    pub fn update_settings(&self, update: &LiveSettingsUpdate) -> Result<LiveSettings, LoopError> {
        let mut core = self.inner.core.lock();
        let merged = core.state.settings.merged(update)?;
        core.state.settings = merged;
        info!(?merged, "Live settings updated");
        Ok(merged)
    }

    pub fn settings(&self) -> LiveSettings {
        self.inner.core.lock().state.settings
    }

    pub fn is_running(&self) -> bool {
        self.inner.core.lock().state.enabled
    }

    pub fn status(&self) -> LiveStatus {
        let core = self.inner.core.lock();
        LiveStatus::capture(&core.state, &core.session)
    }

    async fn tick_if_current(&self, expected_generation: Option<u64>) {
        let generation = {
            let mut core = self.inner.core.lock();
            let state = &mut core.state;

            if expected_generation.is_some_and(|g| g != state.generation) {
                debug!("Timer from previous generation ignored");
                return;
            }
            if !state.enabled {
                debug!("Tick ignored: live loop not running");
                return;
            }
            if state.in_flight {
                debug!(generation = state.generation, "Tick dropped: inference in flight");
                return;
            }

            state.in_flight = true;
            state.generation
        };

        // Own task: dropping the caller's future must not strand `in_flight`
        let this = self.clone();
        let cycle = tokio::spawn(async move { this.run_cycle(generation).await });

        if let Err(e) = cycle.await {
            error!(error = %e, generation, "Live cycle task failed");
            let mut core = self.inner.core.lock();
            let state = &mut core.state;
            if state.accepts(generation) {
                state.in_flight = false;
                let delay_ms = next_delay(
                    0.0,
                    state.settings.base_interval_ms,
                    state.settings.adaptive,
                );
                self.arm_next(state, delay_ms);
            }
        }
    }

    async fn run_cycle(&self, generation: u64) {
        let Some(frame) = self.inner.frames.capture() else {
            self.finish_cycle(generation, None, Err(CycleError::CaptureUnavailable));
            return;
        };

        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.inner.request_timeout,
            self.inner.classifier.classify(&frame),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CycleError::Network(format!(
                "Classifier did not respond within {} ms",
                self.inner.request_timeout.as_millis()
            ))),
        };

        self.finish_cycle(generation, Some(elapsed_millis(started)), result);
    }

    fn finish_cycle(
        &self,
        generation: u64,
        latency_ms: Option<u64>,
        result: Result<Prediction, CycleError>,
    ) {
        let mut to_commit = None;

        {
            let mut core = self.inner.core.lock();
            let Core { state, session } = &mut *core;

            if !state.accepts(generation) {
                debug!(
                    generation,
                    current_generation = state.generation,
                    "Discarding result from stale live loop generation"
                );
                return;
            }

            state.in_flight = false;
            if latency_ms.is_some() {
                session.latency_ms = latency_ms;
            }

            let confidence = match result {
                Ok(prediction) => {
                    session.error_message = None;
                    session.trail.record(prediction.label.clone(), prediction.confidence);
                    session.window.push(prediction.label.clone());

                    let candidate = session.window.candidate(&prediction.label);
                    let decision = ConfidenceGate::from(&state.settings)
                        .evaluate(candidate, prediction.confidence);
                    session.pending_mood = Some(decision.candidate.clone());

                    debug!(
                        label = %prediction.label,
                        confidence = prediction.confidence,
                        candidate = %decision.candidate,
                        commit = decision.commit,
                        latency_ms = ?latency_ms,
                        "Live prediction applied"
                    );

                    self.inner.events.emit_lossy(MoodEvent::PredictionUpdated {
                        session_id: state.session_id,
                        label: prediction.label.clone(),
                        confidence: prediction.confidence,
                        candidate: decision.candidate.clone(),
                        generation,
                        timestamp: now(),
                    });

                    if decision.commit {
                        to_commit = Some(decision.candidate);
                    }

                    let confidence = prediction.confidence;
                    session.last_prediction = Some(prediction);
                    confidence
                }
                Err(err) => {
                    let message = err.user_message(Endpoint::Live);
                    let fatal = err.is_fatal();
                    session.error_message = Some(message.clone());

                    self.inner.events.emit_lossy(MoodEvent::CycleFailed {
                        session_id: state.session_id,
                        kind: err.kind(),
                        message,
                        fatal,
                        timestamp: now(),
                    });

                    if fatal {
                        error!(error = %err, "Fatal classifier failure, stopping live loop");
                        self.halt(state, "fatal classifier failure");
                        return;
                    }

                    warn!(error = %err, kind = err.kind().as_str(), "Live cycle failed, retrying");
                    0.0
                }
            };

            let delay_ms = next_delay(
                confidence,
                state.settings.base_interval_ms,
                state.settings.adaptive,
            );
            debug!(delay_ms, confidence, "Next live inference scheduled");
            self.arm_next(state, delay_ms);
        }

        if let Some(mood) = to_commit {
            self.inner.consumer.commit(&mood, CommitSource::Auto);
        }
    }

    fn arm_next(&self, state: &mut LoopState, delay_ms: u64) {
        if !state.enabled {
            return;
        }

        let this = self.clone();
        let generation = state.generation;
        state.timer.arm(Duration::from_millis(delay_ms), move || {
            tokio::spawn(async move {
                this.tick_if_current(Some(generation)).await;
            });
        });
    }

    fn halt(&self, state: &mut LoopState, reason: &str) {
        state.enabled = false;
        state.in_flight = false;
        state.timer.cancel();
        state.generation += 1;

        if state.phase != LoopPhase::Stopped {
            let old_phase = std::mem::replace(&mut state.phase, LoopPhase::Stopped);
            info!(session_id = %state.session_id, reason, "Live loop stopped");
            self.emit_phase_change(state.session_id, old_phase, LoopPhase::Stopped);
        }
    }

    fn emit_phase_change(&self, session_id: Uuid, old_phase: LoopPhase, new_phase: LoopPhase) {
        self.inner.events.emit_lossy(MoodEvent::LoopStateChanged {
            session_id,
            old_phase,
            new_phase,
            timestamp: now(),
        });
    }
}
