//! # bcast-store
//!
//! Durable store: whole-collection JSON persistence for messages, groups,
//! and admins, including the admin-shape coercion step on load.

mod error;
mod json_store;

pub use error::StorageError;
pub use json_store::JsonStore;
