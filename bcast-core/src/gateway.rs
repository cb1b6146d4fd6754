//! Messenger gateway abstraction.
//!
//! [`Gateway`] is transport-agnostic; the application crate implements it via
//! teloxide, tests substitute recording fakes or mocks.

use crate::error::Result;
use async_trait::async_trait;

/// Abstraction over the messaging transport. Failures carry no structured
/// reason beyond the error text; callers log and move on.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    /// Sends an image with a caption to the given chat.
    async fn send_image(&self, chat_id: i64, image: &[u8], caption: &str) -> Result<()>;
    /// Sends a message and returns its id for later `edit_text` (progress reports).
    async fn send_text_and_return_id(&self, chat_id: i64, text: &str) -> Result<String>;
    /// Edits an already-sent message. `message_id` is transport-specific.
    async fn edit_text(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()>;
}
