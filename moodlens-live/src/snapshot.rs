//! One-shot snapshot analysis
//!
//! Capture a single frame, classify it against the snapshot endpoint and
//! commit the result. Runs independently of the live loop; at most one
//! snapshot is in progress at a time.

use moodlens_common::events::CommitSource;
use moodlens_common::MoodLabel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::capture::FrameSource;
use crate::consumer::MoodConsumer;
use crate::error::CycleError;
use crate::inference::Classifier;

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("Snapshot already in progress")]
    Busy,

    #[error(transparent)]
    Failed(#[from] CycleError),
}

pub struct SnapshotCapture {
    frames: Arc<dyn FrameSource>,
    classifier: Arc<dyn Classifier>,
    consumer: Arc<dyn MoodConsumer>,
    request_timeout: Duration,
    busy: AtomicBool,
}

/// Clears the busy flag on every exit path
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SnapshotCapture {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        classifier: Arc<dyn Classifier>,
        consumer: Arc<dyn MoodConsumer>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            frames,
            classifier,
            consumer,
            request_timeout,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Capture, classify and commit one frame
    ///
    /// # Errors
    /// - [`SnapshotError::Busy`] if another snapshot is still running
    /// - [`SnapshotError::Failed`] on capture or classifier failure; nothing
    ///   is committed
    pub async fn capture_once(&self) -> Result<MoodLabel, SnapshotError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(SnapshotError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let frame = self.frames.capture().ok_or(CycleError::CaptureUnavailable)?;

        let result = match tokio::time::timeout(
            self.request_timeout,
            self.classifier.classify(&frame),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CycleError::Network(format!(
                "Classifier did not respond within {} ms",
                self.request_timeout.as_millis()
            ))),
        };
        let prediction = result.inspect_err(|e| warn!(error = %e, "Snapshot analysis failed"))?;

        info!(label = %prediction.label, confidence = prediction.confidence, "Snapshot analyzed");
        self.consumer.commit(&prediction.label, CommitSource::Snapshot);
        Ok(prediction.label)
    }
}
