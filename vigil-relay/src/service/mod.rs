//! Service layer
//!
//! Services hold the relay's decision logic: which records are worth
//! forwarding and which have already been forwarded. They are independent
//! of the network and injected into the poller.
//!
//! All services are trait-based to enable testing and dependency injection.

mod admission;
mod dedup;

// Re-export traits
pub use admission::AdmissionPolicy;
pub use dedup::DedupTracker;

// Re-export implementations
pub use admission::ConfidenceThreshold;
pub use dedup::InMemoryDedupTracker;
