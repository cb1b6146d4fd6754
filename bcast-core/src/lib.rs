//! # bcast-core
//!
//! Transport-agnostic core for the broadcast bot: domain types, the error
//! taxonomy, the [`Gateway`] trait, and tracing initialization.

mod error;
mod gateway;
mod logger;
mod types;

pub use error::{BcastError, CommandError, Result};
pub use gateway::Gateway;
pub use logger::init_tracing;
pub use types::{base64_bytes, ChatRef, Event, Group, Payload, StoredMessage};
