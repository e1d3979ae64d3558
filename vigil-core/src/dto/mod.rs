//! Data Transfer Objects
//!
//! Payloads exchanged with external services: the ingestion sink's request
//! body and the small JSON replies of the source's auxiliary commands.

pub mod count;
pub mod envelope;
