//! Application state
//!
//! Configuration and wiring of the concrete adapters

use crate::classifier::HttpClassifier;
use crate::history_store::{HistoryStore, HistoryStoreConfig, DEFAULT_CAPACITY};
use crate::locator::Locator;
use crate::orchestrator::CaptureOrchestrator;
use crate::persistence::FileStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Classification service endpoint
    pub classifier_url: String,
    /// Directory for persisted history
    pub history_dir: PathBuf,
    /// Maximum retained history entries
    pub history_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier_url: std::env::var("CLASSIFIER_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api/analyze".to_string()),
            history_dir: std::env::var("HISTORY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/lib/patrol/history")),
            history_capacity: std::env::var("HISTORY_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// HistoryStore (bounded persisted ledger)
    pub history: Arc<HistoryStore>,
    /// CaptureOrchestrator (capture pipeline)
    pub orchestrator: Arc<CaptureOrchestrator>,
}

impl AppState {
    /// Wire the concrete adapters together.
    ///
    /// The locator is injected because positioning is a platform
    /// capability the embedding application provides; devices without
    /// one pass `NullLocator`.
    pub async fn init(config: AppConfig, locator: Arc<dyn Locator>) -> Self {
        let store = Arc::new(FileStore::new(config.history_dir.clone()));
        let history = Arc::new(
            HistoryStore::open(
                store,
                HistoryStoreConfig {
                    capacity: config.history_capacity,
                    ..HistoryStoreConfig::default()
                },
            )
            .await,
        );

        let classifier = Arc::new(HttpClassifier::new(config.classifier_url.clone()));
        let orchestrator = Arc::new(CaptureOrchestrator::new(
            classifier,
            locator,
            history.clone(),
        ));

        tracing::info!(
            classifier_url = %config.classifier_url,
            history_dir = %config.history_dir.display(),
            history_capacity = config.history_capacity,
            "Patrol capture core initialized"
        );

        Self {
            config,
            history,
            orchestrator,
        }
    }
}
