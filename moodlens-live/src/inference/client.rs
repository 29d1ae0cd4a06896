//! Classifier HTTP client
//!
//! One request per frame: a multipart upload with a single `snapshot`
//! part. No retries here; retry policy belongs to the live loop cadence.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use super::types::{interpret_response, Prediction};
use super::Endpoint;
use crate::capture::EncodedImage;
use crate::error::CycleError;

const USER_AGENT: &str = concat!("moodlens/", env!("CARGO_PKG_VERSION"));

/// External image classifier
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one encoded frame
    ///
    /// # Errors
    /// Any [`CycleError`] except `CaptureUnavailable`
    async fn classify(&self, frame: &EncodedImage) -> Result<Prediction, CycleError>;
}

/// Classifier reached over HTTP
pub struct HttpClassifier {
    http_client: reqwest::Client,
    url: String,
    endpoint: Endpoint,
}

impl HttpClassifier {
    pub fn new(
        url: impl Into<String>,
        endpoint: Endpoint,
        timeout: Duration,
    ) -> Result<Self, CycleError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CycleError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            endpoint,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, frame: &EncodedImage) -> Result<Prediction, CycleError> {
        let part = Part::bytes(frame.bytes.clone())
            .file_name(self.endpoint.file_name())
            .mime_str(frame.format.mime_type())
            .map_err(|e| CycleError::Network(format!("Failed to build upload: {}", e)))?;
        let form = Form::new().part("snapshot", part);

        tracing::debug!(
            url = %self.url,
            bytes = frame.bytes.len(),
            "Submitting frame to classifier"
        );

        let response = self
            .http_client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CycleError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let result = interpret_read(status, response.bytes().await, self.endpoint);
        if let Ok(prediction) = &result {
            tracing::debug!(
                label = %prediction.label,
                confidence = prediction.confidence,
                "Classifier responded"
            );
        }
        result
    }
}

/// Interpret a response whose body may not have arrived in full
///
/// The status line was received, so a body failure never counts as a
/// network error: the status alone decides fatal vs transient, and a 2xx
/// without a readable body is malformed.
fn interpret_read<B, E>(
    status: u16,
    body: Result<B, E>,
    endpoint: Endpoint,
) -> Result<Prediction, CycleError>
where
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    match body {
        Ok(bytes) => interpret_response(status, bytes.as_ref(), endpoint),
        Err(e) => {
            tracing::warn!(status, error = %e, "Classifier response body unreadable");
            interpret_response(status, &[], endpoint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClassifier::new(
            "http://127.0.0.1:5000/api/camera/analyze",
            Endpoint::Live,
            Duration::from_secs(10),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().url(), "http://127.0.0.1:5000/api/camera/analyze");
    }

    #[tokio::test]
    async fn test_unreachable_classifier_is_network_error() {
        // Port 9 (discard) on localhost is essentially never listening
        let client = HttpClassifier::new(
            "http://127.0.0.1:9/analyze",
            Endpoint::Live,
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client
            .classify(&EncodedImage::jpeg(vec![0xFF, 0xD8]))
            .await
            .unwrap_err();
        assert!(matches!(err, CycleError::Network(_)), "{:?}", err);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unreadable_body_keeps_fatal_status() {
        for status in [500u16, 503, 403] {
            let err = interpret_read(status, Err::<Vec<u8>, _>("connection reset"), Endpoint::Live)
                .unwrap_err();
            assert!(err.is_fatal(), "{status} with truncated body must stay fatal");
            assert_eq!(err.user_message(Endpoint::Live), "Error analyzing live frame.");
        }
    }

    #[test]
    fn test_unreadable_body_on_other_statuses() {
        let err = interpret_read(422, Err::<Vec<u8>, _>("connection reset"), Endpoint::Live)
            .unwrap_err();
        assert!(matches!(err, CycleError::TransientService { status: 422, message: None }));

        let err = interpret_read(200, Err::<Vec<u8>, _>("connection reset"), Endpoint::Live)
            .unwrap_err();
        assert!(matches!(err, CycleError::MalformedResponse { .. }));
    }

    #[test]
    fn test_readable_body_is_interpreted() {
        let p = interpret_read(
            200,
            Ok::<_, String>(br#"{"label": "Sad", "confidence": 0.7}"#.to_vec()),
            Endpoint::Live,
        )
        .unwrap();
        assert_eq!(p.label.as_str(), "Sad");
    }
}
