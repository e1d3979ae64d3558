//! Core domain types
//!
//! Structures describing detection events as the annotation source reports
//! them. Shared between the relay (which forwards them) and the CLI (which
//! inspects them).

pub mod record;
