//! Label smoothing over a short window of recent raw labels

use moodlens_common::MoodLabel;
use std::collections::{HashMap, VecDeque};

/// Number of recent labels the dominant label is voted over
pub const SMOOTHING_WINDOW: usize = 5;

/// Bounded FIFO of recent raw labels
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    labels: VecDeque<MoodLabel>,
    capacity: usize,
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new(SMOOTHING_WINDOW)
    }
}

impl SmoothingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            labels: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a raw label, evicting the oldest beyond capacity
    pub fn push(&mut self, label: MoodLabel) {
        self.labels.push_back(label);
        while self.labels.len() > self.capacity {
            self.labels.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels oldest first
    pub fn labels(&self) -> impl Iterator<Item = &MoodLabel> {
        self.labels.iter()
    }

    /// Majority label of the window, `None` when empty
    ///
    /// The most recent label starts as the best candidate; distinct labels
    /// are then visited in order of first appearance and replace it only
    /// with a strictly higher count. A tie with the newest label therefore
    /// keeps the newest label.
    pub fn dominant(&self) -> Option<MoodLabel> {
        let newest = self.labels.back()?;

        let mut counts: HashMap<&MoodLabel, usize> = HashMap::new();
        let mut first_seen: Vec<&MoodLabel> = Vec::new();
        for label in &self.labels {
            let count = counts.entry(label).or_insert(0);
            if *count == 0 {
                first_seen.push(label);
            }
            *count += 1;
        }

        let mut best = newest;
        let mut best_count = counts[newest];
        for label in first_seen {
            let count = counts[label];
            if count > best_count {
                best = label;
                best_count = count;
            }
        }

        Some(best.clone())
    }

    /// Dominant label, falling back to `raw` when the window is empty
    pub fn candidate(&self, raw: &MoodLabel) -> MoodLabel {
        self.dominant().unwrap_or_else(|| raw.clone())
    }
}
