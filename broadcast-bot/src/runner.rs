//! Update runner: converts teloxide messages into core events and passes
//! them to the engine router (spawned per update so the loop is never
//! blocked by a long broadcast).

use std::sync::Arc;

use anyhow::Result;
use bcast_core::{ChatRef, Event, Payload};
use bcast_engine::Engine;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;
use tracing::{error, info, instrument};

/// Starts the update loop with the given teloxide Bot and engine.
#[instrument(skip(bot, engine))]
pub async fn run_repl(bot: teloxide::Bot, engine: Arc<Engine>) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(username = ?me.user.username, "Bot identity confirmed");
    }

    teloxide::repl(bot, move |bot: Bot, msg: teloxide::types::Message| {
        let engine = engine.clone();

        async move {
            match to_event(&bot, &msg).await {
                Some(event) => {
                    info!(
                        user_id = event.user_id,
                        chat_id = event.chat.id,
                        "Received event"
                    );
                    // Handle in a spawned task so the update loop returns
                    // immediately; broadcasts pace themselves internally.
                    tokio::spawn(async move {
                        if let Err(e) = engine.handle_event(event).await {
                            error!(error = %e, "Event handling failed");
                        }
                    });
                }
                None => {
                    info!(chat_id = msg.chat.id.0, "Ignoring non-actionable update");
                }
            }

            Ok(())
        }
    })
    .await;

    Ok(())
}

/// Maps a Telegram message to a core event: text as-is, photos downloaded
/// into memory (largest size). Updates without a sender or usable payload
/// are dropped.
async fn to_event(bot: &teloxide::Bot, msg: &teloxide::types::Message) -> Option<Event> {
    let user_id = msg.from.as_ref()?.id.0 as i64;
    let chat = ChatRef {
        id: msg.chat.id.0,
        title: msg.chat.title().map(|t| t.to_string()),
        is_group: msg.chat.is_group() || msg.chat.is_supergroup(),
    };

    if let Some(text) = msg.text() {
        return Some(Event {
            user_id,
            chat,
            payload: Payload::Text(text.to_string()),
        });
    }

    if let Some(photos) = msg.photo() {
        let largest = photos.last()?;
        match download_photo(bot, largest).await {
            Ok(bytes) => {
                return Some(Event {
                    user_id,
                    chat,
                    payload: Payload::Photo(bytes),
                });
            }
            Err(e) => {
                error!(error = %e, chat_id = chat.id, "Failed to download photo");
                return None;
            }
        }
    }

    None
}

async fn download_photo(bot: &teloxide::Bot, photo: &PhotoSize) -> Result<Vec<u8>> {
    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;
    Ok(bytes)
}
