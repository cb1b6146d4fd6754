//! # broadcast-bot
//!
//! Telegram application for the broadcast engine: env config, the teloxide
//! gateway adapter, and the update runner. All broadcast logic lives in
//! `bcast-engine`; this crate only handles Telegram connectivity.

pub mod config;
pub mod gateway;
pub mod runner;

pub use config::BotConfig;
pub use gateway::{parse_message_id, TelegramGateway};
pub use runner::run_repl;
