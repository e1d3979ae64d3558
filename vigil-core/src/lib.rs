//! Vigil Core
//!
//! Core types shared by the Vigil relay and its tooling.
//!
//! This crate contains:
//! - Domain types: detection records as reported by the annotation source
//! - DTOs: the envelope forwarded to the ingestion sink
//! - Protocol: command tokens and framing constants of the source's TCP services

pub mod domain;
pub mod dto;
pub mod protocol;
