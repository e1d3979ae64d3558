//! Repository layer
//!
//! Repositories are thin adapters over the external services the relay
//! talks to: the source's log and image services and the ingestion sink.
//! They carry no business logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod images;
mod logs;
mod sink;

// Re-export traits
pub use images::ImageRepository;
pub use logs::LogRepository;
pub use sink::SinkRepository;

// Re-export implementations
pub use images::TcpImageRepository;
pub use logs::TcpLogRepository;
pub use sink::HttpSinkRepository;
