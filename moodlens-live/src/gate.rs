//! Confidence gate: decides whether a smoothed candidate is auto-committed

use moodlens_common::MoodLabel;

use crate::settings::LiveSettings;

/// Gate outcome for one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    /// Always exposed as the pending mood
    pub candidate: MoodLabel,
    /// Commit `candidate` to the consumer now
    pub commit: bool,
}

/// Auto-commit policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    pub auto_apply: bool,
    pub min_confidence: f64,
}

impl From<&LiveSettings> for ConfidenceGate {
    fn from(settings: &LiveSettings) -> Self {
        Self {
            auto_apply: settings.auto_apply,
            min_confidence: settings.min_confidence,
        }
    }
}

impl ConfidenceGate {
    /// Judge `candidate` against the raw `confidence` of the triggering frame
    pub fn evaluate(&self, candidate: MoodLabel, confidence: f64) -> GateDecision {
        let commit =
            self.auto_apply && confidence >= self.min_confidence && !candidate.is_blank();
        GateDecision { candidate, commit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(auto_apply: bool) -> ConfidenceGate {
        ConfidenceGate { auto_apply, min_confidence: 0.55 }
    }

    #[test]
    fn test_commits_above_threshold() {
        let d = gate(true).evaluate("Happy".into(), 0.7);
        assert!(d.commit);
        assert_eq!(d.candidate.as_str(), "Happy");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(gate(true).evaluate("Happy".into(), 0.55).commit);
    }

    #[test]
    fn test_low_confidence_still_yields_candidate() {
        let d = gate(true).evaluate("Happy".into(), 0.4);
        assert!(!d.commit);
        assert_eq!(d.candidate.as_str(), "Happy");
    }

    #[test]
    fn test_auto_apply_off_never_commits() {
        assert!(!gate(false).evaluate("Happy".into(), 0.99).commit);
    }

    #[test]
    fn test_blank_candidate_never_commits() {
        assert!(!gate(true).evaluate(" ".into(), 0.99).commit);
    }
}
