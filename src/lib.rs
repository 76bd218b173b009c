//! Patrol Capture Core
//!
//! Capture-to-result orchestration and bounded history for electrical
//! insulator patrol inspections.
//!
//! ## Architecture (6 Components)
//!
//! 1. CaptureOrchestrator - capture pipeline (preview, fan-out, merge, record)
//! 2. HistoryStore - bounded, persisted ledger of past results
//! 3. Classifier - remote condition classification adapter
//! 4. Locator - best-effort device positioning port
//! 5. KeyValueStore - durable key-value persistence port
//! 6. AppState - configuration and component wiring
//!
//! ## Design Principles
//!
//! - Location and persistence are best-effort: their failures degrade
//!   gracefully and never abort a capture
//! - Classification failures are fatal to the capture and leave no
//!   partial history behind
//! - The in-memory history is the source of truth for the session;
//!   durable writes follow it

pub mod classifier;
pub mod error;
pub mod history_store;
pub mod locator;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod state;

pub use error::{Error, Result};
pub use state::AppState;
