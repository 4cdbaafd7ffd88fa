//! Shared workspace entities.

pub mod model;

pub use model::Workspace;
