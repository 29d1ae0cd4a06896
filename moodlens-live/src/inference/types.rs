//! Prediction model and classifier response validation
//!
//! The classifier answers with loosely-typed JSON. It is checked against a
//! strict schema here; anything that does not fit is a
//! [`CycleError::MalformedResponse`] rather than partially accepted data.

use moodlens_common::MoodLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Endpoint;
use crate::error::{classify_status, CycleError};

/// One successful classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Top label
    pub label: MoodLabel,
    /// Confidence of `label` (0.0-1.0)
    pub confidence: f64,
    /// Per-label probabilities, possibly empty
    #[serde(default)]
    pub probabilities: BTreeMap<MoodLabel, f64>,
}

/// One row of the probability breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityEntry {
    pub label: MoodLabel,
    pub probability: f64,
}

impl Prediction {
    pub fn new(label: impl Into<MoodLabel>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            probabilities: BTreeMap::new(),
        }
    }

    /// Highest `max_items` probabilities, descending
    ///
    /// Equal probabilities keep label order.
    pub fn top_probabilities(&self, max_items: usize) -> Vec<ProbabilityEntry> {
        let mut entries: Vec<ProbabilityEntry> = self
            .probabilities
            .iter()
            .map(|(label, probability)| ProbabilityEntry {
                label: label.clone(),
                probability: *probability,
            })
            .collect();

        entries.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        entries.truncate(max_items);
        entries
    }
}

/// Success body as sent on the wire; every field optional so that
/// validation can name what is missing
#[derive(Debug, Deserialize)]
struct WireResponse {
    label: Option<String>,
    confidence: Option<f64>,
    probabilities: Option<BTreeMap<String, f64>>,
    error: Option<String>,
}

/// Failure body: `{ "error": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

fn malformed(message: Option<String>, detail: impl Into<String>) -> CycleError {
    CycleError::MalformedResponse {
        message,
        detail: detail.into(),
    }
}

fn valid_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl WireResponse {
    fn into_prediction(self, endpoint: Endpoint) -> Result<Prediction, CycleError> {
        let error = self.error.filter(|e| !e.trim().is_empty());

        let label = match self.label {
            Some(label) if !label.trim().is_empty() => MoodLabel::new(label),
            Some(_) => return Err(malformed(error, "label is blank")),
            None => return Err(malformed(error, "label missing")),
        };

        let confidence = match self.confidence {
            Some(c) if valid_probability(c) => c,
            Some(c) => return Err(malformed(error, format!("confidence {} out of range", c))),
            None if endpoint.requires_confidence() => {
                return Err(malformed(error, "confidence missing"))
            }
            None => 0.0,
        };

        let mut probabilities = BTreeMap::new();
        for (name, p) in self.probabilities.unwrap_or_default() {
            if !valid_probability(p) {
                return Err(malformed(
                    error,
                    format!("probability for {} out of range", name),
                ));
            }
            probabilities.insert(MoodLabel::new(name), p);
        }

        Ok(Prediction {
            label,
            confidence,
            probabilities,
        })
    }
}

/// Turn a raw classifier exchange into a prediction or a classified failure
pub fn interpret_response(
    status: u16,
    body: &[u8],
    endpoint: Endpoint,
) -> Result<Prediction, CycleError> {
    if (200..300).contains(&status) {
        let wire: WireResponse = serde_json::from_slice(body)
            .map_err(|e| malformed(None, format!("body does not match schema: {}", e)))?;
        return wire.into_prediction(endpoint);
    }

    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty());

    Err(classify_status(status, message))
}
