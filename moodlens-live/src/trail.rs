//! Diagnostic trail of recent raw predictions
//!
//! Nothing in the decision path reads the trail.

use chrono::{DateTime, Utc};
use moodlens_common::MoodLabel;
use serde::Serialize;
use std::collections::VecDeque;

/// Number of raw results kept for diagnostics
pub const TRAIL_WINDOW: usize = 12;

/// One raw result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailEntry {
    pub label: MoodLabel,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Bounded append-only log, oldest evicted first
#[derive(Debug, Clone)]
pub struct TrailRecorder {
    entries: VecDeque<TrailEntry>,
    capacity: usize,
}

impl Default for TrailRecorder {
    fn default() -> Self {
        Self::new(TRAIL_WINDOW)
    }
}

impl TrailRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, label: MoodLabel, confidence: f64) {
        self.push(TrailEntry {
            label,
            confidence,
            timestamp: moodlens_common::time::now(),
        });
    }

    pub fn push(&mut self, entry: TrailEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first
    pub fn entries(&self) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter()
    }

    /// Snapshot newest first, the order the trail is displayed in
    pub fn newest_first(&self) -> Vec<TrailEntry> {
        self.entries.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteenth_entry_evicts_oldest() {
        let mut trail = TrailRecorder::default();
        for i in 0..13 {
            trail.record(MoodLabel::new(format!("L{i}")), i as f64 / 13.0);
        }

        assert_eq!(trail.len(), TRAIL_WINDOW);
        let labels: Vec<String> = trail.entries().map(|e| e.label.to_string()).collect();
        let expected: Vec<String> = (1..13).map(|i| format!("L{i}")).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_newest_first() {
        let mut trail = TrailRecorder::default();
        trail.record("Happy".into(), 0.9);
        trail.record("Sad".into(), 0.4);

        let view = trail.newest_first();
        assert_eq!(view[0].label.as_str(), "Sad");
        assert_eq!(view[1].label.as_str(), "Happy");
        assert!(view[0].timestamp >= view[1].timestamp);
    }

    #[test]
    fn test_clear() {
        let mut trail = TrailRecorder::default();
        trail.record("Happy".into(), 0.9);
        trail.clear();
        assert!(trail.is_empty());
    }
}
