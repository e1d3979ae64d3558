//! Configuration module
//!
//! Handles CLI configuration: where the annotation source lives and how long
//! to wait for it.

use std::time::Duration;

use vigil_client::SourceClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host of the annotation source
    pub source_host: String,
    /// Port of the log service
    pub log_port: u16,
    /// Port of the image service
    pub image_port: u16,
    /// Connect/read timeout
    pub timeout: Duration,
}

impl Config {
    /// Builds a source client for this configuration
    pub fn source_client(&self) -> SourceClient {
        SourceClient::new(self.source_host.clone())
            .with_ports(self.log_port, self.image_port)
            .with_timeout(self.timeout)
    }
}
