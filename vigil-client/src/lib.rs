//! Vigil Client
//!
//! Clients for the services the relay sits between: the annotation source's
//! two raw TCP services (detection logs and images) and the HTTP ingestion
//! sink.
//!
//! Every source request opens its own connection, sends one newline-terminated
//! command and reads one reply. Nothing is pooled or kept alive between calls.
//!
//! # Example
//!
//! ```no_run
//! use vigil_client::SourceClient;
//!
//! #[tokio::main]
//! async fn main() -> vigil_client::Result<()> {
//!     let source = SourceClient::new("127.0.0.1");
//!
//!     for record in source.fetch_logs().await? {
//!         let image = source.fetch_image(&record.image_name).await?;
//!         println!("{}: {} bytes", record, image.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod framing;
mod images;
mod logs;
mod sink;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use sink::{DEFAULT_SINK_TIMEOUT, SinkClient};
pub use vigil_core::domain::record::LogRecord;
pub use vigil_core::dto::envelope::ForwardEnvelope;

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use vigil_core::protocol::{Command, DEFAULT_IMAGE_PORT, DEFAULT_LOG_PORT};

use crate::framing::timed;

/// Default timeout for connecting to and reading from the source
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default upper bound of the single read that receives a log batch
///
/// A batch whose JSON is larger than this is truncated and fails to parse.
pub const DEFAULT_MAX_LOG_READ_BYTES: usize = 64 * 1024;

/// Default upper bound of a declared image size
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Client for the annotation source's log and image services
///
/// Requests are grouped by service:
/// - Log service: pending detection records, record count
/// - Image service: single image fetch, image listing
#[derive(Debug, Clone)]
pub struct SourceClient {
    /// Host of both services
    host: String,
    /// Port of the log service
    log_port: u16,
    /// Port of the image service
    image_port: u16,
    /// Applied to the connect and to every individual read/write
    timeout: Duration,
    /// Size of the single bounded read for log replies
    max_log_read_bytes: usize,
    /// Largest `FILESIZE` accepted before reading the body
    max_image_bytes: u64,
}

impl SourceClient {
    /// Create a client for a source on `host` with the default ports
    ///
    /// # Example
    /// ```
    /// use vigil_client::SourceClient;
    ///
    /// let client = SourceClient::new("127.0.0.1");
    /// assert_eq!(client.log_addr(), "127.0.0.1:9001");
    /// ```
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            log_port: DEFAULT_LOG_PORT,
            image_port: DEFAULT_IMAGE_PORT,
            timeout: DEFAULT_SOURCE_TIMEOUT,
            max_log_read_bytes: DEFAULT_MAX_LOG_READ_BYTES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Override the log and image service ports
    pub fn with_ports(mut self, log_port: u16, image_port: u16) -> Self {
        self.log_port = log_port;
        self.image_port = image_port;
        self
    }

    /// Override the connect/read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the bounded read size for log replies
    pub fn with_max_log_read_bytes(mut self, max: usize) -> Self {
        self.max_log_read_bytes = max;
        self
    }

    /// Override the largest accepted image size
    pub fn with_max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = max;
        self
    }

    /// Address of the log service
    pub fn log_addr(&self) -> String {
        format!("{}:{}", self.host, self.log_port)
    }

    /// Address of the image service
    pub fn image_addr(&self) -> String {
        format!("{}:{}", self.host, self.image_port)
    }

    /// Open a fresh connection and send one command
    async fn send_command(&self, addr: &str, command: &Command) -> Result<TcpStream> {
        let mut stream = match timed(self.timeout, TcpStream::connect(addr)).await? {
            Ok(stream) => stream,
            Err(source) => {
                return Err(ClientError::Connection {
                    addr: addr.to_string(),
                    source,
                });
            }
        };

        timed(self.timeout, stream.write_all(&command.encode())).await??;
        Ok(stream)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SourceClient::new("10.0.0.5");
        assert_eq!(client.log_addr(), "10.0.0.5:9001");
        assert_eq!(client.image_addr(), "10.0.0.5:9002");
    }

    #[test]
    fn test_client_with_ports() {
        let client = SourceClient::new("localhost").with_ports(7001, 7002);
        assert_eq!(client.log_addr(), "localhost:7001");
        assert_eq!(client.image_addr(), "localhost:7002");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        let port = testing::closed_port().await;
        let client = SourceClient::new("127.0.0.1").with_ports(port, port);

        let err = client
            .send_command(&client.log_addr(), &Command::GetLogs)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
        assert!(err.is_transient());
    }
}
