//! Scheduler layer for the relay
//!
//! This layer drives the relay: it polls the source on a fixed cadence and
//! walks every record through admission, dedup, image fetch and delivery.

pub mod outcome;
pub mod poller;

pub use poller::{RelayPoller, Repositories};
