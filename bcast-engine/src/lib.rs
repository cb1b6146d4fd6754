//! # bcast-engine
//!
//! The stateful broadcast engine: one shared state object, access control,
//! the compose state machine, the one-shot dispatcher, the rotating
//! auto-broadcast scheduler, and the command router.
//!
//! ## Modules
//!
//! - [`state`] – Engine, EngineState, broadcast flags
//! - `access` – admin membership and /add_admin
//! - `composer` – per-user compose sessions
//! - `dispatcher` – one-shot broadcast
//! - `scheduler` – recurring auto-broadcast
//! - [`router`] – command parsing and dispatch

mod access;
mod composer;
mod dispatcher;
mod router;
mod scheduler;
mod state;

pub use composer::ComposeSession;
pub use router::Command;
pub use state::{Engine, EngineState};
