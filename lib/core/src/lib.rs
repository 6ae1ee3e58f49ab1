//! Core types shared across the log-gateway crates.
//!
//! This crate provides the session identifier, the rootcause-backed
//! `Result` alias, and the timestamp format used in every JSON envelope the
//! gateway emits.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::iso_timestamp;
pub use error::Result;
pub use id::{ParseIdError, SessionId};
