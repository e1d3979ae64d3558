//! Log service requests

use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use vigil_core::domain::record::LogRecord;
use vigil_core::dto::count::CountResponse;
use vigil_core::protocol::{Command, ERROR_PREFIX};

use crate::SourceClient;
use crate::error::{ClientError, Result};
use crate::framing::timed;

impl SourceClient {
    // =============================================================================
    // Detection Logs
    // =============================================================================

    /// Fetch the pending detection records
    ///
    /// Sends `GET_LOGS` and decodes the JSON array from a single bounded
    /// read. The source drains its log on every request, so records
    /// returned here are not offered again.
    ///
    /// # Returns
    /// The records in source order; an empty reply yields an empty batch.
    /// Elements that do not decode as a record are logged and skipped so the
    /// rest of the batch survives.
    pub async fn fetch_logs(&self) -> Result<Vec<LogRecord>> {
        self.request_logs(&Command::GetLogs).await
    }

    /// Fetch at most the last `n` pending records (`GET_LOGS:<n>`)
    pub async fn fetch_last_logs(&self, n: u32) -> Result<Vec<LogRecord>> {
        self.request_logs(&Command::GetLastLogs(n)).await
    }

    /// Fetch the pending records, reporting any failure as an empty batch
    ///
    /// Connection failures, timeouts, empty replies and undecodable
    /// payloads are logged and treated as "no records this cycle".
    pub async fn fetch_pending_logs(&self) -> Vec<LogRecord> {
        match self.fetch_logs().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to fetch logs from {}: {}", self.log_addr(), e);
                Vec::new()
            }
        }
    }

    /// Number of records currently pending at the source (`GET_COUNT`)
    pub async fn count_pending(&self) -> Result<u64> {
        let reply = self.bounded_exchange(&Command::GetCount).await?;
        let reply = check_remote_error(&reply)?;

        let count: CountResponse = serde_json::from_str(reply)
            .map_err(|e| ClientError::ParseError(format!("invalid count reply: {}", e)))?;
        Ok(count.count)
    }

    async fn request_logs(&self, command: &Command) -> Result<Vec<LogRecord>> {
        let reply = self.bounded_exchange(command).await?;
        let reply = check_remote_error(&reply)?;

        if reply.is_empty() {
            debug!("Log service returned an empty reply");
            return Ok(Vec::new());
        }

        let elements: Vec<serde_json::Value> = serde_json::from_str(reply)
            .map_err(|e| ClientError::ParseError(format!("invalid log batch: {}", e)))?;

        let total = elements.len();
        let records: Vec<LogRecord> = elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| match serde_json::from_value(element) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed log record #{}: {}", index, e);
                    None
                }
            })
            .collect();

        debug!("Received {} of {} log record(s)", records.len(), total);
        Ok(records)
    }

    /// Sends `command` to the log service and performs one bounded read
    async fn bounded_exchange(&self, command: &Command) -> Result<String> {
        let addr = self.log_addr();
        let mut stream = self.send_command(&addr, command).await?;

        let mut buf = vec![0u8; self.max_log_read_bytes];
        let n = timed(self.timeout, stream.read(&mut buf)).await??;
        buf.truncate(n);

        if n == self.max_log_read_bytes {
            warn!(
                "Log reply filled the {} byte read limit and may be truncated",
                self.max_log_read_bytes
            );
        }

        String::from_utf8(buf)
            .map_err(|_| ClientError::ParseError("log reply is not valid UTF-8".to_string()))
    }
}

/// Maps an `ERROR:<message>` reply to [`ClientError::Remote`]
fn check_remote_error(reply: &str) -> Result<&str> {
    let reply = reply.trim();
    match reply.strip_prefix(ERROR_PREFIX) {
        Some(message) => Err(ClientError::Remote(message.trim().to_string())),
        None => Ok(reply),
    }
}
