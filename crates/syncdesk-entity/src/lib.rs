//! # syncdesk-entity
//!
//! Domain models for the SyncDesk index. Every struct in this crate is a
//! persisted record or a value object. All entities derive `Debug`,
//! `Clone`, `Serialize` and `Deserialize`; records reference each other by
//! key, never by ownership.

pub mod file;
pub mod profile;
pub mod workspace;
