//! Relay configuration
//!
//! Defines the source and sink addresses, polling cadence, admission
//! threshold and the timeouts and size limits applied to every network call.

use std::time::Duration;

use vigil_client::{
    DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_LOG_READ_BYTES, DEFAULT_SINK_TIMEOUT,
    DEFAULT_SOURCE_TIMEOUT,
};
use vigil_core::protocol::{DEFAULT_IMAGE_PORT, DEFAULT_LOG_PORT};

/// Relay configuration
///
/// Intervals and timeouts are configurable to allow tuning for different
/// deployments (local testing vs. a remote source over a slow link).
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier of this relay instance, used in logs
    pub relay_id: String,

    /// Host of the annotation source
    pub source_host: String,

    /// Port of the source's log service
    pub log_port: u16,

    /// Port of the source's image service
    pub image_port: u16,

    /// Ingestion endpoint URL (e.g., "http://127.0.0.1:5000/api/receive")
    pub sink_url: String,

    /// Pause after every completed poll cycle
    pub poll_interval: Duration,

    /// Pause after a cycle that failed outside per-record handling
    pub error_backoff: Duration,

    /// Minimum confidence for a record to be forwarded
    pub confidence_threshold: f64,

    /// Connect/read timeout for the source services
    pub source_timeout: Duration,

    /// Request timeout for sink deliveries
    pub sink_timeout: Duration,

    /// Size of the single bounded read that receives a log batch
    pub max_log_read_bytes: usize,

    /// Largest image the relay will accept from the source
    pub max_image_bytes: u64,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(relay_id: String, source_host: String, sink_url: String) -> Self {
        Self {
            relay_id,
            source_host,
            log_port: DEFAULT_LOG_PORT,
            image_port: DEFAULT_IMAGE_PORT,
            sink_url,
            poll_interval: Duration::from_secs(2),
            error_backoff: Duration::from_secs(5),
            confidence_threshold: 0.6,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            sink_timeout: DEFAULT_SINK_TIMEOUT,
            max_log_read_bytes: DEFAULT_MAX_LOG_READ_BYTES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and falls back to the default:
    /// - RELAY_ID (default: random UUID)
    /// - SOURCE_HOST (default: 127.0.0.1)
    /// - LOG_PORT (default: 9001)
    /// - IMAGE_PORT (default: 9002)
    /// - SINK_URL (default: http://127.0.0.1:5000/api/receive)
    /// - POLL_INTERVAL (seconds, default: 2)
    /// - ERROR_BACKOFF (seconds, default: 5)
    /// - CONFIDENCE_THRESHOLD (default: 0.6)
    /// - SOURCE_TIMEOUT (seconds, default: 5)
    /// - SINK_TIMEOUT (seconds, default: 5)
    /// - MAX_LOG_READ_BYTES (default: 65536)
    /// - MAX_IMAGE_BYTES (default: 33554432)
    ///
    /// A variable that is set but cannot be parsed is an error rather than
    /// a silent fallback.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            relay_id: std::env::var("RELAY_ID").unwrap_or(defaults.relay_id),
            source_host: std::env::var("SOURCE_HOST").unwrap_or(defaults.source_host),
            log_port: env_parse("LOG_PORT")?.unwrap_or(defaults.log_port),
            image_port: env_parse("IMAGE_PORT")?.unwrap_or(defaults.image_port),
            sink_url: std::env::var("SINK_URL").unwrap_or(defaults.sink_url),
            poll_interval: env_secs("POLL_INTERVAL")?.unwrap_or(defaults.poll_interval),
            error_backoff: env_secs("ERROR_BACKOFF")?.unwrap_or(defaults.error_backoff),
            confidence_threshold: env_parse("CONFIDENCE_THRESHOLD")?
                .unwrap_or(defaults.confidence_threshold),
            source_timeout: env_secs("SOURCE_TIMEOUT")?.unwrap_or(defaults.source_timeout),
            sink_timeout: env_secs("SINK_TIMEOUT")?.unwrap_or(defaults.sink_timeout),
            max_log_read_bytes: env_parse("MAX_LOG_READ_BYTES")?
                .unwrap_or(defaults.max_log_read_bytes),
            max_image_bytes: env_parse("MAX_IMAGE_BYTES")?.unwrap_or(defaults.max_image_bytes),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.relay_id.is_empty() {
            anyhow::bail!("relay_id cannot be empty");
        }

        if self.source_host.is_empty() {
            anyhow::bail!("source_host cannot be empty");
        }

        if self.log_port == 0 || self.image_port == 0 {
            anyhow::bail!("log_port and image_port must be greater than 0");
        }

        if !self.sink_url.starts_with("http://") && !self.sink_url.starts_with("https://") {
            anyhow::bail!("sink_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.error_backoff.is_zero() {
            anyhow::bail!("error_backoff must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!("confidence_threshold must be within [0, 1]");
        }

        if self.source_timeout.is_zero() || self.sink_timeout.is_zero() {
            anyhow::bail!("timeouts must be greater than 0");
        }

        if self.max_log_read_bytes == 0 {
            anyhow::bail!("max_log_read_bytes must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            "127.0.0.1".to_string(),
            "http://127.0.0.1:5000/api/receive".to_string(),
        )
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> anyhow::Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(None),
    }
}

fn env_secs(key: &str) -> anyhow::Result<Option<Duration>> {
    Ok(env_parse::<u64>(key)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_port, 9001);
        assert_eq!(config.image_port, 9002);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.error_backoff, Duration::from_secs(5));
        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.source_timeout, Duration::from_secs(5));
        assert_eq!(config.sink_timeout, Duration::from_secs(5));
        assert_eq!(config.max_log_read_bytes, 65536);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid URL should fail
        config.sink_url = "127.0.0.1:5000/api/receive".to_string();
        assert!(config.validate().is_err());
        config.sink_url = "http://127.0.0.1:5000/api/receive".to_string();

        // Threshold outside [0, 1] should fail
        config.confidence_threshold = 1.5;
        assert!(config.validate().is_err());
        config.confidence_threshold = 0.0;
        assert!(config.validate().is_ok());

        // Zero interval should fail
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = Duration::from_secs(1);

        config.source_host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_parse_unset_variable() {
        assert_eq!(
            env_parse::<u16>("VIGIL_TEST_SURELY_UNSET_VARIABLE").unwrap(),
            None
        );
    }
}
