//! Core data model for patrol captures

use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Insulator condition reported by the classification service
///
/// The service contract restricts responses to these four values;
/// anything else deserializes to `Uncertain` since the remote service
/// is not under this system's control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Condition {
    Normal,
    Flashover,
    Broken,
    Uncertain,
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Normal" => Condition::Normal,
            "Flashover" => Condition::Flashover,
            "Broken" => Condition::Broken,
            "Uncertain" => Condition::Uncertain,
            // Out-of-contract value from the remote service
            _ => Condition::Uncertain,
        }
    }
}

impl Condition {
    /// Stable string form (matches the service contract spelling)
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Normal => "Normal",
            Condition::Flashover => "Flashover",
            Condition::Broken => "Broken",
            Condition::Uncertain => "Uncertain",
        }
    }

    /// Severity rank for presentation ordering (0 = no concern)
    pub fn severity(&self) -> i32 {
        match self {
            Condition::Normal => 0,
            Condition::Uncertain => 1,
            Condition::Flashover => 2,
            Condition::Broken => 3,
        }
    }

    /// Whether the condition calls for maintenance follow-up
    pub fn needs_attention(&self) -> bool {
        match self {
            Condition::Normal | Condition::Uncertain => false,
            Condition::Flashover | Condition::Broken => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device position in degrees; no range validation, values are trusted
/// to come from the platform positioning service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Completed analysis of a single capture
///
/// Produced exactly once per capture by merging the classifier output
/// with the locator output; immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub condition: Condition,
    /// Confidence score, clamped to [0, 100]
    pub confidence: f32,
    pub description: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Persisted record of a past capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Opaque unique id
    pub id: String,
    /// Capture time, epoch milliseconds
    pub timestamp: i64,
    /// Self-contained image payload (data URI), viewable without
    /// network access or any transient in-memory handle
    pub image_data: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

impl HistoryEntry {
    /// Build an entry from a merged result and its encoded image
    pub fn new(analysis: AnalysisResult, image_data: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            image_data,
            analysis,
        }
    }
}

/// Raw image handed to the capture pipeline
#[derive(Debug, Clone)]
pub struct CaptureImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl CaptureImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// JPEG capture (the common case for camera output)
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode once; the same payload feeds both classification and the
    /// persisted history entry
    pub fn encode(&self) -> EncodedImage {
        EncodedImage {
            base64: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Base64 form of a capture, transferable to the classification service
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub base64: String,
    pub mime_type: String,
}

impl EncodedImage {
    /// Self-contained data URI, decodable without any external fetch
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}
