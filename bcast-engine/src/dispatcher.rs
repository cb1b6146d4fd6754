//! One-shot broadcast dispatcher: sends every stored message to every group
//! in persisted order, pacing between sends and counting failures instead of
//! aborting on them.

use std::sync::atomic::Ordering;

use bcast_core::{CommandError, Group, Result, StoredMessage};
use tracing::{info, warn};

use crate::state::{BroadcastGuard, Engine};

impl Engine {
    /// `/broadcast`: one-shot broadcast of all messages to all groups.
    ///
    /// The in-progress flag is held through a guard that clears it on Drop,
    /// so any early return or propagated error still releases the lock.
    /// Replies are made by editing the progress message, so the router gets
    /// no separate reply text back.
    pub async fn broadcast_all(&self, requester_id: i64, reply_chat: i64) -> Result<Option<String>> {
        self.require_admin(requester_id).await?;
        if self.one_shot_in_progress.load(Ordering::SeqCst) {
            return Err(CommandError::BroadcastInProgress.into());
        }

        let (messages, groups) = {
            let state = self.state.lock().await;
            (state.messages.clone(), state.groups.clone())
        };
        if messages.is_empty() {
            return Err(CommandError::NoMessages.into());
        }
        if groups.is_empty() {
            return Err(CommandError::NoGroups.into());
        }

        let _guard = BroadcastGuard::acquire(&self.one_shot_in_progress)
            .ok_or(CommandError::BroadcastInProgress)?;

        let progress_id = self
            .gateway
            .send_text_and_return_id(reply_chat, "Broadcast started...")
            .await?;

        let total_groups = groups.len();
        let mut successes = 0usize;
        let mut attempts = 0usize;

        for (done, message) in messages.iter().enumerate().map(|(i, m)| (i + 1, m)) {
            for group in &groups {
                attempts += 1;
                match self.send_to_group(message, group).await {
                    Ok(()) => {
                        successes += 1;
                        info!(
                            message_id = message.id,
                            chat_id = group.chat_id,
                            title = %group.title,
                            "Broadcast send ok"
                        );
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            message_id = message.id,
                            chat_id = group.chat_id,
                            title = %group.title,
                            "Broadcast send failed"
                        );
                    }
                }
                // Pacing applies after every send, success or failure.
                tokio::time::sleep(self.pacing).await;
            }

            self.gateway
                .edit_text(
                    reply_chat,
                    &progress_id,
                    &format!(
                        "Broadcasting...\nMessages: {}/{}\nSuccessful sends: {}/{}",
                        done,
                        messages.len(),
                        successes,
                        attempts
                    ),
                )
                .await?;
        }

        let total_attempts = messages.len() * total_groups;
        self.gateway
            .edit_text(
                reply_chat,
                &progress_id,
                &format!(
                    "Broadcast finished!\n\nResults:\nMessages sent: {}\nGroups: {}\nSuccessful: {}/{}\nFailed: {}\n\nRun another with /broadcast",
                    messages.len(),
                    total_groups,
                    successes,
                    total_attempts,
                    total_attempts - successes
                ),
            )
            .await?;

        info!(
            messages = messages.len(),
            groups = total_groups,
            successes,
            failures = total_attempts - successes,
            "Broadcast finished"
        );
        Ok(None)
    }

    /// Sends one message to one group, choosing text or image+caption.
    pub(crate) async fn send_to_group(&self, message: &StoredMessage, group: &Group) -> Result<()> {
        match &message.image {
            Some(image) if message.has_image => {
                self.gateway
                    .send_image(group.chat_id, image, &message.text)
                    .await
            }
            _ => self.gateway.send_text(group.chat_id, &message.text).await,
        }
    }
}
