//! `entbridge-client`
//!
//! **Responsibility:** enterprise single sign-on on the client side.
//!
//! This crate provides:
//! - Token and session persistence on an injectable key-value store
//! - The session bridge (token discovery, exchange, auto login, logout)
//! - Verification and refresh of the enterprise session
//! - Permission resolution over the `entbridge-auth` rule tables
//! - Guard rendering decisions
//!
//! The server stays the authority: nothing here validates a token.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod context;
pub mod guard;
pub mod location;
pub mod resolver;
pub mod session_store;
pub mod storage;
pub mod token_store;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{EnterpriseBackend, HttpBackend};
pub use bridge::{Access, Session, SessionBridge};
pub use config::{ClientConfig, ConfigError};
pub use context::AuthContext;
pub use guard::{
    Determination, Guard, GuardProps, GuardSlot, MultiPermissionGuard, PermissionGuard, Render,
    RoleGuard, RouteGuard,
};
pub use location::{Location, StaticLocation};
pub use resolver::{PermissionResolver, PermissionState};
pub use session_store::{SessionStore, UserInfo};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use token_store::TokenStore;
pub use verification::VerificationClient;
