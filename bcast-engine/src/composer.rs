//! Message composer: a three-stage per-user session turning a sequence of
//! inbound events into a stored message (text, then optional photo).
//!
//! Sessions are keyed by user id and only ever fed by private-chat events
//! from admins; group events never reach the composer.

use bcast_core::{CommandError, Event, Result, StoredMessage};
use chrono::Utc;
use tracing::info;

use crate::state::{Engine, EngineState};

/// Compose stage. `Idle` is represented by the absence of a session, so a
/// session holding pending text is always awaiting the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeSession {
    AwaitingText,
    AwaitingImage { pending_text: String },
}

impl Engine {
    /// `/add_message`: opens (or restarts) a compose session for the user.
    pub(crate) async fn cmd_add_message(&self, event: &Event) -> Result<Option<String>> {
        self.require_admin(event.user_id).await?;
        let mut state = self.state.lock().await;
        state
            .sessions
            .insert(event.user_id, ComposeSession::AwaitingText);
        info!(user_id = event.user_id, "Compose session started");
        Ok(Some(
            "Send the text of the message to broadcast.\n\n\
             You can attach a photo afterwards (optional)."
                .to_string(),
        ))
    }

    /// Plain text: captured only when the user is in `AwaitingText`;
    /// otherwise the event falls through unhandled.
    pub(crate) async fn handle_text(&self, event: &Event, text: &str) -> Result<Option<String>> {
        if event.chat.is_group || !self.is_admin(event.user_id).await {
            return Ok(None);
        }

        let mut state = self.state.lock().await;
        match state.sessions.get(&event.user_id) {
            Some(ComposeSession::AwaitingText) => {
                state.sessions.insert(
                    event.user_id,
                    ComposeSession::AwaitingImage {
                        pending_text: text.to_string(),
                    },
                );
                Ok(Some(format!(
                    "Text saved!\n\nText: {}\n\nNow send a PHOTO for this message,\nor /skip_photo to store it without one.",
                    text
                )))
            }
            _ => Ok(None),
        }
    }

    /// Photo: completes the session when the text has been captured; a photo
    /// before the text is an ordering error and does not advance the session.
    pub(crate) async fn handle_photo(&self, event: &Event, image: &[u8]) -> Result<Option<String>> {
        if event.chat.is_group || !self.is_admin(event.user_id).await {
            return Ok(None);
        }

        let mut state = self.state.lock().await;
        match state.sessions.get(&event.user_id) {
            Some(ComposeSession::AwaitingImage { pending_text }) => {
                let text = pending_text.clone();
                let message =
                    self.finalize_message(&mut state, event.user_id, text, Some(image.to_vec()));
                Ok(Some(format!(
                    "Message with photo stored!\n\nText: {}\nPhoto: attached\nId: {}\n\nBroadcast it with /broadcast",
                    message.text, message.id
                )))
            }
            Some(ComposeSession::AwaitingText) => Err(CommandError::ComposeOutOfOrder.into()),
            None => Ok(None),
        }
    }

    /// `/skip_photo`: completes the session without an image.
    pub(crate) async fn cmd_skip_photo(&self, event: &Event) -> Result<Option<String>> {
        self.require_admin(event.user_id).await?;

        let mut state = self.state.lock().await;
        match state.sessions.get(&event.user_id) {
            Some(ComposeSession::AwaitingImage { pending_text }) => {
                let text = pending_text.clone();
                let message = self.finalize_message(&mut state, event.user_id, text, None);
                Ok(Some(format!(
                    "Message stored (no photo)!\n\nText: {}\nPhoto: none\nId: {}\n\nBroadcast it with /broadcast",
                    message.text, message.id
                )))
            }
            Some(ComposeSession::AwaitingText) => Err(CommandError::ComposeOutOfOrder.into()),
            None => Err(CommandError::NoComposeSession.into()),
        }
    }

    /// Appends the finished message, persists the collection, and clears the
    /// user's session.
    fn finalize_message(
        &self,
        state: &mut EngineState,
        user_id: i64,
        text: String,
        image: Option<Vec<u8>>,
    ) -> StoredMessage {
        let message = StoredMessage {
            id: state.next_message_id(),
            has_image: image.is_some(),
            image,
            text,
            created_at: Utc::now(),
            created_by: user_id.to_string(),
        };
        state.messages.push(message.clone());
        self.persist_messages(&state.messages);
        state.sessions.remove(&user_id);
        info!(
            id = message.id,
            has_image = message.has_image,
            created_by = %message.created_by,
            "Stored new broadcast message"
        );
        message
    }
}
