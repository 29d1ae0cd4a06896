//! Mood labels and the mood → genre mapping used by song recommendation
//!
//! Labels come straight from the classifier and are treated as opaque
//! strings. The well-known set is listed in [`KNOWN_MOODS`] for display
//! purposes only; nothing here rejects a label outside of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels the bundled classifier is known to emit
pub const KNOWN_MOODS: [&str; 7] = [
    "Angry", "Disgust", "Scared", "Happy", "Sad", "Surprised", "Neutral",
];

/// Classifier label for a mood (e.g. "Happy")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodLabel(String);

impl MoodLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the label carries no usable text
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Recommendation genre for this mood, see [`genre_for_mood`]
    pub fn genre(&self) -> String {
        genre_for_mood(&self.0)
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MoodLabel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MoodLabel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for MoodLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Map a mood label onto the genre bucket the song catalogue is keyed by
///
/// Case and surrounding whitespace are ignored. Unknown moods map to
/// their own normalized form so new classifier labels still reach the
/// catalogue lookup.
pub fn genre_for_mood(mood: &str) -> String {
    let normalized = mood.trim().to_lowercase();
    match normalized.as_str() {
        "disgust" | "sad" => "sad".to_string(),
        "happy" => "happy".to_string(),
        "scared" | "angry" | "neutral" => "calm".to_string(),
        "surprised" => "energetic".to_string(),
        _ => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_mapping_known_moods() {
        assert_eq!(genre_for_mood("Sad"), "sad");
        assert_eq!(genre_for_mood("Disgust"), "sad");
        assert_eq!(genre_for_mood("happy"), "happy");
        assert_eq!(genre_for_mood("Scared"), "calm");
        assert_eq!(genre_for_mood("ANGRY"), "calm");
        assert_eq!(genre_for_mood("Neutral"), "calm");
        assert_eq!(genre_for_mood("Surprised"), "energetic");
    }

    #[test]
    fn test_genre_mapping_unknown_mood_passes_through_normalized() {
        assert_eq!(genre_for_mood("  Curious "), "curious");
        assert_eq!(genre_for_mood(""), "");
    }

    #[test]
    fn test_every_known_mood_has_a_bucket() {
        let buckets = ["sad", "happy", "calm", "energetic"];
        for mood in KNOWN_MOODS {
            assert!(buckets.contains(&genre_for_mood(mood).as_str()), "{mood}");
        }
    }

    #[test]
    fn test_mood_label_is_opaque_and_serializes_as_string() {
        let label = MoodLabel::from("Bewildered");
        assert_eq!(label.as_str(), "Bewildered");
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"Bewildered\"");

        let parsed: MoodLabel = serde_json::from_str("\"Happy\"").unwrap();
        assert_eq!(parsed, MoodLabel::new("Happy"));
        assert_eq!(parsed.genre(), "happy");
    }

    #[test]
    fn test_blank_label() {
        assert!(MoodLabel::new("   ").is_blank());
        assert!(!MoodLabel::new("Sad").is_blank());
    }
}
