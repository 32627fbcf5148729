//! `entbridge-chat`
//!
//! **Responsibility:** per-user chat sessions on the third-party chat service.
//!
//! The wire format (paths, query string, share URL) is owned by that service
//! and reproduced exactly; see [`client`].

pub mod client;
pub mod config;
pub mod error;

pub use client::{session_name, ChatClient, ChatSession};
pub use config::ChatConfig;
pub use error::ChatError;
