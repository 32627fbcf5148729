//! `entbridge-core` — wire envelope and error model shared by every crate.
//!
//! This crate contains **no I/O**: it only describes the shape of remote
//! responses and the failure taxonomy the client layers convert into.

pub mod envelope;
pub mod error;

pub use envelope::{ApiEnvelope, Failure, RetCode};
pub use error::{BridgeError, BridgeResult};
