//! Image service requests

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::debug;
use vigil_core::protocol::{
    Command, ERROR_PREFIX, IMAGES_PREFIX, MAX_HEADER_LEN, is_valid_image_name,
};

use crate::SourceClient;
use crate::error::{ClientError, Result};
use crate::framing::{parse_image_header, read_body, read_line_unbuffered, timed};

/// Longest `LIST_IMAGES` reply line accepted
const MAX_LIST_LEN: u64 = 1024 * 1024;

impl SourceClient {
    // =============================================================================
    // Images
    // =============================================================================

    /// Fetch one image by name
    ///
    /// Sends `GET_IMAGE:<name>`, scans the `FILESIZE:<n>` header off the raw
    /// stream and then reads exactly `n` body bytes.
    ///
    /// # Errors
    /// - [`ClientError::Protocol`] for an invalid name or a malformed header
    /// - [`ClientError::Remote`] when the source answers `ERROR:<message>`
    /// - [`ClientError::PartialTransfer`] when the peer closes mid-body
    /// - [`ClientError::Connection`] / [`ClientError::Timeout`] on network failure
    pub async fn fetch_image(&self, name: &str) -> Result<Vec<u8>> {
        if !is_valid_image_name(name) {
            return Err(ClientError::Protocol(format!(
                "refusing to request invalid image name {:?}",
                name
            )));
        }

        let addr = self.image_addr();
        let mut stream = self
            .send_command(&addr, &Command::GetImage(name.to_string()))
            .await?;

        let header = read_line_unbuffered(&mut stream, MAX_HEADER_LEN, self.timeout).await?;
        let size = parse_image_header(&header)?;

        if size > self.max_image_bytes {
            return Err(ClientError::Protocol(format!(
                "declared size {} exceeds limit of {} bytes",
                size, self.max_image_bytes
            )));
        }

        let body = read_body(&mut stream, size, self.timeout).await?;
        debug!("Fetched image {} ({} bytes)", name, body.len());

        Ok(body)
    }

    /// List the images the source can serve (`LIST_IMAGES`)
    ///
    /// Only a text line follows this command, so the reply is read through
    /// a buffered reader with a 1 MiB cap.
    pub async fn list_images(&self) -> Result<Vec<String>> {
        let addr = self.image_addr();
        let stream = self.send_command(&addr, &Command::ListImages).await?;

        let mut reader = BufReader::new(stream.take(MAX_LIST_LEN));
        let mut line = String::new();
        let n = timed(self.timeout, reader.read_line(&mut line)).await??;

        if n as u64 == MAX_LIST_LEN && !line.ends_with('\n') {
            return Err(ClientError::Protocol(format!(
                "image list exceeds {} bytes",
                MAX_LIST_LEN
            )));
        }

        let line = line.trim();

        if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
            return Err(ClientError::Remote(message.trim().to_string()));
        }

        let names = line
            .strip_prefix(IMAGES_PREFIX)
            .ok_or_else(|| ClientError::Protocol(format!("malformed image list: {:?}", line)))?;

        Ok(names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect())
    }
}
