//! Downstream mood consumer
//!
//! The recommendation side only needs "here is the current mood". Commits
//! are fire-and-forget: the loop never waits on or hears back from them.

use moodlens_common::events::{CommitSource, EventBus, MoodEvent};
use moodlens_common::MoodLabel;
use tracing::info;

/// Receiver of committed moods
pub trait MoodConsumer: Send + Sync {
    fn commit(&self, mood: &MoodLabel, source: CommitSource);
}

/// Publishes commits as `MoodCommitted` events on the bus
#[derive(Debug, Clone)]
pub struct EventBusConsumer {
    events: EventBus,
}

impl EventBusConsumer {
    pub fn new(events: EventBus) -> Self {
        Self { events }
    }
}

impl MoodConsumer for EventBusConsumer {
    fn commit(&self, mood: &MoodLabel, source: CommitSource) {
        let genre = mood.genre();
        info!(mood = %mood, genre = %genre, source = ?source, "Mood committed");

        self.events.emit_lossy(MoodEvent::MoodCommitted {
            mood: mood.clone(),
            genre,
            source,
            timestamp: moodlens_common::time::now(),
        });
    }
}
