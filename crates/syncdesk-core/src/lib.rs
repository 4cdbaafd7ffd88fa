//! # syncdesk-core
//!
//! Core crate for SyncDesk. Contains configuration schemas, typed
//! identifiers, path helpers, index events, the collaborator traits that
//! need no entity types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SyncDesk crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
