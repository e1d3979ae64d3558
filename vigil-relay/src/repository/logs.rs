//! Logs repository
//!
//! Fetches pending detection records from the source's log service.

use anyhow::Result;
use async_trait::async_trait;
use vigil_client::{LogRecord, SourceClient};

/// Repository trait for the detection log source
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Fetches the current batch of pending records, in source order
    ///
    /// An `Err` is reserved for failures the caller should back off from;
    /// ordinary "nothing available" conditions yield an empty batch.
    async fn fetch_pending(&self) -> Result<Vec<LogRecord>>;
}

/// TCP implementation of LogRepository
pub struct TcpLogRepository {
    client: SourceClient,
}

impl TcpLogRepository {
    /// Creates a new TCP log repository
    ///
    /// # Arguments
    /// * `client` - Source client configured with the log service address
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogRepository for TcpLogRepository {
    async fn fetch_pending(&self) -> Result<Vec<LogRecord>> {
        // Connection, empty-reply and parse failures are already reported
        // (and logged) as an empty batch by the client.
        Ok(self.client.fetch_pending_logs().await)
    }
}
