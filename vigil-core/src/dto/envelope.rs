//! Sink envelope
//!
//! The JSON body posted to the ingestion endpoint for each forwarded record.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::domain::record::LogRecord;

/// Forwarded detection: label, base64 image and confidence
///
/// Built fresh for every admitted record, sent once, then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardEnvelope {
    /// Detected object label
    pub object: String,

    /// Image bytes in standard base64
    pub image: String,

    /// Detector confidence
    pub confidence: f64,
}

impl ForwardEnvelope {
    /// Builds the envelope for a record and its fetched image
    pub fn new(record: &LogRecord, image: &[u8]) -> Self {
        Self {
            object: record.object_label.clone(),
            image: STANDARD.encode(image),
            confidence: record.confidence,
        }
    }

    /// Decodes the transported image back into raw bytes
    pub fn decode_image(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serializes_sink_fields() {
        let record = LogRecord::new("a.jpg", "Persona", 0.95);
        let envelope = ForwardEnvelope::new(&record, &[0xff, 0xd8, 0xff, 0x00]);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["object"], "Persona");
        assert_eq!(value["image"], "/9j/AA==");
        assert_eq!(value["confidence"], 0.95);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_binary_image_survives_encoding() {
        let image: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let envelope = ForwardEnvelope::new(&LogRecord::new("x.png", "Gato", 0.7), &image);

        assert_eq!(envelope.decode_image().unwrap(), image);
    }
}
