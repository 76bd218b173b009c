//! CaptureOrchestrator - Capture-to-Result Pipeline
//!
//! ## Responsibilities
//!
//! - Publish an immediate local preview of the capture
//! - Fan out locate / classify / minimum-display delay concurrently
//! - Merge results only after all three have settled
//! - Record successful captures in the history store
//!
//! Classification failure aborts the capture and leaves no history
//! behind; location and durability failures degrade silently.

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::history_store::HistoryStore;
use crate::locator::{self, Locator};
use crate::models::{AnalysisResult, CaptureImage, HistoryEntry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bounded timeout for the positioning query
    pub locate_timeout: Duration,
    /// Minimum time before results are surfaced, so the caller's UI
    /// does not flash an instantaneous result
    pub min_display: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            locate_timeout: Duration::from_millis(5000),
            min_display: Duration::from_millis(2000),
        }
    }
}

/// Locally-displayable preview, published before analysis completes
#[derive(Debug, Clone)]
pub struct ImagePreview {
    /// Self-contained data URI of the capture
    pub data_uri: String,
    pub mime_type: String,
}

/// CaptureOrchestrator instance
pub struct CaptureOrchestrator {
    classifier: Arc<dyn Classifier>,
    locator: Arc<dyn Locator>,
    history: Arc<HistoryStore>,
    config: OrchestratorConfig,
    preview_tx: watch::Sender<Option<ImagePreview>>,
}

impl CaptureOrchestrator {
    /// Create an orchestrator with default timings
    pub fn new(
        classifier: Arc<dyn Classifier>,
        locator: Arc<dyn Locator>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self::with_config(classifier, locator, history, OrchestratorConfig::default())
    }

    /// Create an orchestrator with custom timings
    pub fn with_config(
        classifier: Arc<dyn Classifier>,
        locator: Arc<dyn Locator>,
        history: Arc<HistoryStore>,
        config: OrchestratorConfig,
    ) -> Self {
        let (preview_tx, _) = watch::channel(None);
        Self {
            classifier,
            locator,
            history,
            config,
            preview_tx,
        }
    }

    /// Subscribe to preview notifications.
    ///
    /// The preview for a capture is published as soon as `process`
    /// starts, before any network work, so a UI can show the picture
    /// while analysis proceeds.
    pub fn subscribe_preview(&self) -> watch::Receiver<Option<ImagePreview>> {
        self.preview_tx.subscribe()
    }

    /// Run one capture end to end.
    ///
    /// Returns the merged result; on success a `HistoryEntry` built from
    /// the same encoded payload has been appended to the history store.
    /// Failures of the locate step and of durable persistence are
    /// absorbed; only classification failures surface.
    pub async fn process(&self, image: CaptureImage) -> Result<AnalysisResult> {
        if image.is_empty() {
            return Err(Error::Validation("Image data is required".to_string()));
        }

        // One encoding feeds preview, classification, and history
        let encoded = image.encode();

        let _ = self.preview_tx.send(Some(ImagePreview {
            data_uri: encoded.data_uri(),
            mime_type: encoded.mime_type.clone(),
        }));

        tracing::debug!(
            mime_type = %encoded.mime_type,
            payload_bytes = encoded.base64.len(),
            "Starting capture analysis"
        );

        // Fan-out: the merge step below only runs once all three have
        // settled, so it never observes partial results
        let (classified, location, _) = tokio::join!(
            self.classifier.classify(&encoded.base64),
            locator::resolve_best_effort(self.locator.as_ref(), self.config.locate_timeout),
            tokio::time::sleep(self.config.min_display),
        );

        let mut result = classified?;
        result.location = location;

        let entry = HistoryEntry::new(result.clone(), encoded.data_uri());
        tracing::info!(
            entry_id = %entry.id,
            condition = %result.condition,
            confidence = result.confidence,
            has_location = result.location.is_some(),
            "Capture classified"
        );

        // Best-effort durability; the store absorbs persistence failures
        self.history.append(entry).await;

        Ok(result)
    }
}
