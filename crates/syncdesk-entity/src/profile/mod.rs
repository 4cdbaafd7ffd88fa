//! Account profile and sync root entities.

pub mod model;

pub use model::{Profile, SyncRoot};
