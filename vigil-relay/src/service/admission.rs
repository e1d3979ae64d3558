//! Admission service
//!
//! Decides whether a detection record is confident enough to forward.

use vigil_core::domain::record::LogRecord;

/// Service trait for record admission
pub trait AdmissionPolicy: Send + Sync {
    /// Returns `true` if the record should proceed to dedup and forwarding
    fn admit(&self, record: &LogRecord) -> bool;
}

/// Admits records whose confidence is at or above a fixed threshold
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThreshold {
    threshold: f64,
}

impl ConfidenceThreshold {
    /// Creates a threshold policy
    ///
    /// # Arguments
    /// * `threshold` - Minimum confidence, inclusive
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The configured threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl AdmissionPolicy for ConfidenceThreshold {
    fn admit(&self, record: &LogRecord) -> bool {
        // NaN compares false and is dropped
        record.confidence >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(confidence: f64) -> LogRecord {
        LogRecord::new("a.jpg", "Persona", confidence)
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = ConfidenceThreshold::default();
        assert_eq!(policy.threshold(), 0.6);

        assert!(policy.admit(&record(0.6)));
        assert!(policy.admit(&record(0.95)));
        assert!(policy.admit(&record(1.0)));
        assert!(!policy.admit(&record(0.59)));
        assert!(!policy.admit(&record(0.0)));
    }

    #[test]
    fn test_nan_confidence_is_dropped() {
        assert!(!ConfidenceThreshold::new(0.0).admit(&record(f64::NAN)));
    }
}
