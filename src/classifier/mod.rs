//! Classifier - Remote Condition Classification Adapter
//!
//! ## Responsibilities
//!
//! - Send the encoded capture to the classification service
//! - Handle response parsing
//! - Collapse transport, status, and payload failures into a single
//!   classification-failure kind for the caller
//!
//! The service is contractually restricted to the four `Condition`
//! values and classifies non-insulator or illegible images as
//! `Uncertain` rather than erroring.

use crate::error::{Error, Result};
use crate::models::{AnalysisResult, Condition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Service-side processing budget before the call is considered failed
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Classification port
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a base64-encoded image into an `AnalysisResult`
    /// (location is left unset; the orchestrator merges it)
    async fn classify(&self, image_base64: &str) -> Result<AnalysisResult>;
}

/// Request body for the classification endpoint
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    image: &'a str,
}

/// Successful response body (HTTP 200)
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    condition: Condition,
    confidence: f32,
    description: String,
    recommendation: String,
}

/// Failure response body (HTTP 400/405/500)
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP classification client
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    /// Create a client with the default 60 s timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parse a successful response body into a result
    fn parse_success(body: &str) -> Result<AnalysisResult> {
        let resp: ClassifyResponse = serde_json::from_str(body).map_err(|e| {
            Error::Classification(format!("Malformed classification payload: {}", e))
        })?;

        Ok(AnalysisResult {
            condition: resp.condition,
            confidence: resp.confidence.clamp(0.0, 100.0),
            description: resp.description,
            recommendation: resp.recommendation,
            location: None,
        })
    }

    /// Extract the server-reported message from a failure body, falling
    /// back to the HTTP status when the body is not the expected shape
    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Classification service returned {}", status))
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image_base64: &str) -> Result<AnalysisResult> {
        if image_base64.is_empty() {
            return Err(Error::Validation("Image data is required".to_string()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { image: image_base64 })
            .send()
            .await
            .map_err(|e| Error::Classification(format!("Classification request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Classification(format!("Classification request failed: {}", e)))?;

        if !status.is_success() {
            let message = Self::error_message(status, &body);
            tracing::error!(
                status = %status,
                message = %message,
                "Classification service error"
            );
            return Err(Error::Classification(message));
        }

        let result = Self::parse_success(&body)?;
        tracing::debug!(
            condition = %result.condition,
            confidence = result.confidence,
            "Classification succeeded"
        );
        Ok(result)
    }
}
