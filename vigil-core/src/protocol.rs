//! Wire protocol of the annotation source
//!
//! Both source services speak newline-terminated ASCII commands over a fresh
//! TCP connection per request. The log service answers with a JSON document;
//! the image service answers with a `FILESIZE:<n>` header line followed by
//! exactly `n` raw bytes.

/// Default port of the log service
pub const DEFAULT_LOG_PORT: u16 = 9001;

/// Default port of the image service
pub const DEFAULT_IMAGE_PORT: u16 = 9002;

/// Prefix of the image header line
pub const FILESIZE_PREFIX: &str = "FILESIZE:";

/// Prefix of an error reply from either service
pub const ERROR_PREFIX: &str = "ERROR:";

/// Prefix of the `LIST_IMAGES` reply
pub const IMAGES_PREFIX: &str = "IMAGES:";

/// Longest header line the image client will scan before giving up
pub const MAX_HEADER_LEN: usize = 256;

/// A command understood by one of the source services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drain all pending log records
    GetLogs,
    /// Drain at most the last `n` pending log records
    GetLastLogs(u32),
    /// Number of pending log records
    GetCount,
    /// One image by name
    GetImage(String),
    /// Names of every image the source can serve
    ListImages,
}

impl Command {
    /// Encodes the command as sent on the wire, newline included
    pub fn encode(&self) -> Vec<u8> {
        let line = match self {
            Command::GetLogs => "GET_LOGS".to_string(),
            Command::GetLastLogs(n) => format!("GET_LOGS:{}", n),
            Command::GetCount => "GET_COUNT".to_string(),
            Command::GetImage(name) => format!("GET_IMAGE:{}", name),
            Command::ListImages => "LIST_IMAGES".to_string(),
        };
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        bytes
    }
}

/// Checks that an image name can be sent in a `GET_IMAGE` command
///
/// The name travels inside a newline-terminated line and the source resolves
/// it against a flat directory, so line breaks and path components are
/// rejected.
pub fn is_valid_image_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains(['/', '\\', '\n', '\r'])
}
