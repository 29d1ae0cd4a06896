//! Test doubles for moodlens-live integration tests
//!
//! - `ScriptedClassifier`: replays queued results, optionally gated so a
//!   call stays in flight until the test releases it
//! - `ScriptedFrames`: frame source that can be switched off
//! - `RecordingConsumer`: remembers every commit
//! - `settle()`: let spawned tasks run without advancing the clock

#![allow(dead_code)]

use async_trait::async_trait;
use moodlens_common::events::{CommitSource, EventBus};
use moodlens_common::MoodLabel;
use moodlens_live::capture::{EncodedImage, FrameSource};
use moodlens_live::consumer::MoodConsumer;
use moodlens_live::error::CycleError;
use moodlens_live::inference::{Classifier, Prediction};
use moodlens_live::{LiveLoop, LiveLoopDeps, LiveSettings};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub fn ok(label: &str, confidence: f64) -> Result<Prediction, CycleError> {
    Ok(Prediction::new(label, confidence))
}

pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<Prediction, CycleError>>>,
    fallback: Result<Prediction, CycleError>,
    gate: Option<Semaphore>,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedClassifier {
    /// Replays `script`, then repeats `fallback` forever
    pub fn new(
        script: Vec<Result<Prediction, CycleError>>,
        fallback: Result<Prediction, CycleError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            gate: None,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn always(result: Result<Prediction, CycleError>) -> Self {
        Self::new(Vec::new(), result)
    }

    /// Every call blocks until `release` hands out a permit
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _frame: &EncodedImage) -> Result<Prediction, CycleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        // Result is fixed at dispatch time
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub struct ScriptedFrames {
    available: AtomicBool,
}

impl ScriptedFrames {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl FrameSource for ScriptedFrames {
    fn capture(&self) -> Option<EncodedImage> {
        self.available
            .load(Ordering::SeqCst)
            .then(|| EncodedImage::jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9]))
    }
}

#[derive(Default)]
pub struct RecordingConsumer {
    commits: Mutex<Vec<(MoodLabel, CommitSource)>>,
}

impl RecordingConsumer {
    pub fn commits(&self) -> Vec<(MoodLabel, CommitSource)> {
        self.commits.lock().unwrap().clone()
    }
}

impl MoodConsumer for RecordingConsumer {
    fn commit(&self, mood: &MoodLabel, source: CommitSource) {
        self.commits.lock().unwrap().push((mood.clone(), source));
    }
}

/// Live loop wired to test doubles
pub struct Harness {
    pub live: LiveLoop,
    pub classifier: Arc<ScriptedClassifier>,
    pub frames: Arc<ScriptedFrames>,
    pub consumer: Arc<RecordingConsumer>,
    pub events: EventBus,
}

impl Harness {
    pub fn new(classifier: ScriptedClassifier, settings: LiveSettings) -> Self {
        Self::with_timeout(classifier, settings, Duration::from_secs(3600))
    }

    pub fn with_timeout(
        classifier: ScriptedClassifier,
        settings: LiveSettings,
        request_timeout: Duration,
    ) -> Self {
        let classifier = Arc::new(classifier);
        let frames = Arc::new(ScriptedFrames::new());
        let consumer = Arc::new(RecordingConsumer::default());
        let events = EventBus::new(64);

        let live = LiveLoop::new(
            LiveLoopDeps {
                frames: frames.clone(),
                classifier: classifier.clone(),
                consumer: consumer.clone(),
                events: events.clone(),
            },
            settings,
            request_timeout,
        );

        Self {
            live,
            classifier,
            frames,
            consumer,
            events,
        }
    }
}

/// Yield repeatedly so spawned timer callbacks and ticks run to completion
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock, then let the fired work run
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}
