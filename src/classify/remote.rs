use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::types::{Classification, LeafClassifier};
use super::ClassifyError;

/// HTTP adapter for a remote classification service.
pub struct HttpClassifier {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpClassifier {
    /// Create a classifier client for the service at `base_url`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    fn encode_png(image: &RgbImage) -> Result<String, ClassifyError> {
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ClassifyError::ImageEncoding(e.to_string()))?;
        Ok(STANDARD.encode(cursor.into_inner()))
    }
}

/// Request body for POST /classify
#[derive(Serialize)]
struct ClassifyRequest {
    image: String,
}

/// Response body from POST /classify
#[derive(Deserialize)]
struct ClassifyResponse {
    label: String,
    confidence: f64,
    probabilities: Vec<f64>,
}

impl LeafClassifier for HttpClassifier {
    fn classify(&self, image: &RgbImage) -> Result<Classification, ClassifyError> {
        let url = format!("{}/classify", self.base_url);
        let body = ClassifyRequest {
            image: Self::encode_png(image)?,
        };
        debug!(
            width = image.width(),
            height = image.height(),
            "posting image for classification"
        );

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ClassifyError::Unreachable(self.base_url.clone())
            } else if e.is_timeout() {
                ClassifyError::Timeout(self.timeout_secs)
            } else {
                ClassifyError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ClassifyResponse = response
            .json()
            .map_err(|e| ClassifyError::ResponseParsing(e.to_string()))?;
        if parsed.probabilities.is_empty() {
            return Err(ClassifyError::EmptyDistribution);
        }

        info!(
            label = %parsed.label,
            confidence = parsed.confidence,
            "classification received"
        );
        Ok(Classification {
            label: parsed.label,
            confidence: parsed.confidence,
            distribution: parsed.probabilities,
        })
    }
}

/// Mock classifier for orchestration tests. Returns a configured verdict
/// and counts invocations so short-circuiting can be asserted.
pub struct MockClassifier {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

enum MockOutcome {
    Classified(Classification),
    Failing(String),
}

impl MockClassifier {
    pub fn returning(classification: Classification) -> Self {
        Self {
            outcome: MockOutcome::Classified(classification),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: MockOutcome::Failing(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `classify` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LeafClassifier for MockClassifier {
    fn classify(&self, _image: &RgbImage) -> Result<Classification, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Classified(classification) => Ok(classification.clone()),
            MockOutcome::Failing(message) => Err(ClassifyError::HttpClient(message.clone())),
        }
    }
}
