//! Framing primitives for the source's raw TCP replies
//!
//! The image service sends a newline-terminated text header directly
//! followed by raw bytes. The header is therefore scanned one byte at a time
//! straight off the stream: a buffered line reader would pull part of the
//! body into its buffer.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use vigil_core::protocol::{ERROR_PREFIX, FILESIZE_PREFIX};

use crate::error::{ClientError, Result};

/// Receive chunk size for body reads
const BODY_CHUNK: usize = 8 * 1024;

/// Runs `fut` under `timeout`, mapping expiry to [`ClientError::Timeout`]
pub(crate) async fn timed<F: Future>(timeout: Duration, fut: F) -> Result<F::Output> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ClientError::Timeout(timeout))
}

/// Reads one line, byte by byte, without consuming anything past the `\n`
///
/// The returned line excludes the newline. Closing the stream before the
/// newline, exceeding `max_len` or sending non-UTF-8 is a protocol error.
pub(crate) async fn read_line_unbuffered<R>(
    reader: &mut R,
    max_len: usize,
    timeout: Duration,
) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::new();

    loop {
        let mut byte = [0u8; 1];
        let n = timed(timeout, reader.read(&mut byte)).await??;

        if n == 0 {
            return Err(ClientError::Protocol(format!(
                "connection closed after {} header byte(s) without newline",
                line.len()
            )));
        }

        if byte[0] == b'\n' {
            break;
        }

        if line.len() == max_len {
            return Err(ClientError::Protocol(format!(
                "header line exceeds {} bytes",
                max_len
            )));
        }

        line.push(byte[0]);
    }

    String::from_utf8(line)
        .map_err(|_| ClientError::Protocol("header line is not valid UTF-8".to_string()))
}

/// Parses an image header line into the declared body length
///
/// Accepts exactly `FILESIZE:<digits>`, tolerating surrounding whitespace
/// (a trailing `\r` included). An `ERROR:<message>` line becomes
/// [`ClientError::Remote`]; anything else is a protocol error.
pub(crate) fn parse_image_header(line: &str) -> Result<u64> {
    let line = line.trim();

    if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
        return Err(ClientError::Remote(message.trim().to_string()));
    }

    let digits = line
        .strip_prefix(FILESIZE_PREFIX)
        .ok_or_else(|| ClientError::Protocol(format!("malformed header: {:?}", line)))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Protocol(format!(
            "malformed size in header: {:?}",
            line
        )));
    }

    digits
        .parse::<u64>()
        .map_err(|_| ClientError::Protocol(format!("size out of range in header: {:?}", line)))
}

/// Reads exactly `len` bytes, over as many receives as the peer needs
///
/// If the peer closes early the bytes received so far are dropped and
/// [`ClientError::PartialTransfer`] is returned.
pub(crate) async fn read_body<R>(reader: &mut R, len: u64, timeout: Duration) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let expected = usize::try_from(len)
        .map_err(|_| ClientError::Protocol(format!("declared size {} does not fit", len)))?;

    let mut body = vec![0u8; expected];
    let mut received = 0usize;

    while received < expected {
        let end = (received + BODY_CHUNK).min(expected);
        let n = timed(timeout, reader.read(&mut body[received..end])).await??;

        if n == 0 {
            return Err(ClientError::PartialTransfer {
                expected: len,
                received: received as u64,
            });
        }

        received += n;
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const T: Duration = Duration::from_secs(1);

    #[test]
    fn test_parse_valid_headers() {
        assert_eq!(parse_image_header("FILESIZE:0").unwrap(), 0);
        assert_eq!(parse_image_header("FILESIZE:48213").unwrap(), 48213);
        assert_eq!(parse_image_header("FILESIZE:1000\r").unwrap(), 1000);
    }

    #[test]
    fn test_parse_malformed_headers() {
        for line in [
            "BADHEADER",
            "",
            "FILESIZE:",
            "FILESIZE:-1",
            "FILESIZE:12a",
            "FILESIZE: 12",
            "filesize:12",
            "FILESIZE:99999999999999999999999",
        ] {
            let err = parse_image_header(line).unwrap_err();
            assert!(
                matches!(err, ClientError::Protocol(_)),
                "{:?} should be a protocol error, got {:?}",
                line,
                err
            );
        }
    }

    #[test]
    fn test_parse_error_reply() {
        let err = parse_image_header("ERROR:Imagen no encontrada").unwrap_err();
        match err {
            ClientError::Remote(message) => assert_eq!(message, "Imagen no encontrada"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_header_scan_stops_at_newline() {
        let mut input: &[u8] = b"FILESIZE:3\n\x00\n\xff";

        let line = read_line_unbuffered(&mut input, 64, T).await.unwrap();
        assert_eq!(line, "FILESIZE:3");
        // Body bytes, including a newline, must still be unread
        assert_eq!(input, b"\x00\n\xff");
    }

    #[tokio::test]
    async fn test_header_scan_rejects_eof_and_overlong() {
        let mut input: &[u8] = b"FILESIZE:3";
        let err = read_line_unbuffered(&mut input, 64, T).await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));

        let long = vec![b'A'; 100];
        let mut input: &[u8] = &long;
        let err = read_line_unbuffered(&mut input, 64, T).await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_body_accumulates_short_reads() {
        let (mut client, mut server) = tokio::io::duplex(16);

        let writer = tokio::spawn(async move {
            let data: Vec<u8> = (0..100u8).collect();
            for chunk in data.chunks(7) {
                server.write_all(chunk).await.unwrap();
            }
        });

        let body = read_body(&mut client, 100, T).await.unwrap();
        assert_eq!(body, (0..100u8).collect::<Vec<_>>());
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_body_partial_transfer() {
        let data = vec![7u8; 500];
        let mut input: &[u8] = &data;

        let err = read_body(&mut input, 1000, T).await.unwrap_err();
        match err {
            ClientError::PartialTransfer { expected, received } => {
                assert_eq!(expected, 1000);
                assert_eq!(received, 500);
            }
            other => panic!("expected partial transfer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_body_read_times_out_on_stalled_peer() {
        let (mut client, _server) = tokio::io::duplex(16);

        let err = read_body(&mut client, 10, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }
}
