//! Detection record domain types

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Label used when the source omits the detected object
pub const UNKNOWN_LABEL: &str = "unknown";

/// Timestamp layout used by the source for `fecha`
pub const CAPTURE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A detection log record as reported by the annotation source
///
/// Field names on the wire are the source's (`imagen`, `objeto`, ...).
/// Missing or `null` fields fall back to an empty image name, the `unknown`
/// label and a confidence of 0.0, so a sparse record is still representable
/// and simply fails admission downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Image identifier, unique per detection event within the source's retention
    #[serde(rename = "imagen", default, deserialize_with = "null_as_default")]
    pub image_name: String,

    /// Detected object label
    #[serde(
        rename = "objeto",
        default = "default_label",
        deserialize_with = "null_as_unknown_label"
    )]
    pub object_label: String,

    /// Detector confidence in [0, 1]
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,

    /// Camera that produced the detection
    #[serde(rename = "camara", default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,

    /// Capture time as formatted by the source
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
}

fn default_label() -> String {
    UNKNOWN_LABEL.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_label))
}

impl LogRecord {
    /// Creates a record with only the fields the relay acts on
    pub fn new(
        image_name: impl Into<String>,
        object_label: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            image_name: image_name.into(),
            object_label: object_label.into(),
            confidence,
            camera: None,
            captured_at: None,
        }
    }

    /// Parses `captured_at`, if present and well formed
    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        self.captured_at
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), CAPTURE_TIME_FORMAT).ok())
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {:.2})",
            self.image_name, self.object_label, self.confidence
        )
    }
}
