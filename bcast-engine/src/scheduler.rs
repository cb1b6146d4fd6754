//! Auto-broadcast scheduler: a recurring task that dispatches exactly one
//! message (round-robin over the collection) to all groups per tick.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use bcast_core::{CommandError, Result};
use tracing::{info, warn};

use crate::state::Engine;

impl Engine {
    /// `/start_auto`: installs the recurring broadcast task. A restart
    /// replaces any previous task. No-op reply when already active.
    pub async fn cmd_start_auto(self: &Arc<Self>, requester_id: i64) -> Result<Option<String>> {
        self.require_admin(requester_id).await?;

        let (message_count, group_count) = {
            let state = self.state.lock().await;
            if state.messages.is_empty() {
                return Err(CommandError::NoMessages.into());
            }
            if state.groups.is_empty() {
                return Err(CommandError::NoGroups.into());
            }
            (state.messages.len(), state.groups.len())
        };

        if self.auto_active.swap(true, Ordering::SeqCst) {
            return Ok(Some("Auto-broadcast is already active.".to_string()));
        }

        let mut task_slot = self.auto_task.lock().await;
        if let Some(previous) = task_slot.take() {
            previous.abort();
        }
        let engine = Arc::clone(self);
        *task_slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(engine.auto_interval);
            // The first interval tick fires immediately; skip it so the
            // first broadcast happens one period after /start_auto.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !engine.auto_active.load(Ordering::SeqCst) {
                    break;
                }
                engine.run_auto_tick().await;
            }
        }));

        info!(
            interval_secs = self.auto_interval.as_secs(),
            "Auto-broadcast started"
        );
        Ok(Some(format!(
            "Auto-broadcast started!\n\nStats:\nMessages: {}\nGroups: {}\nInterval: every {} seconds\n\nThe bot now broadcasts stored messages in rotation.\nStop with /stop_auto",
            message_count,
            group_count,
            self.auto_interval.as_secs()
        )))
    }

    /// `/stop_auto`: clears the active flag; no future tick runs, but a tick
    /// already in flight completes.
    pub async fn cmd_stop_auto(&self, requester_id: i64) -> Result<Option<String>> {
        self.require_admin(requester_id).await?;

        if !self.auto_active.swap(false, Ordering::SeqCst) {
            return Ok(Some("Auto-broadcast is already stopped.".to_string()));
        }

        info!("Auto-broadcast stopped");
        Ok(Some(
            "Auto-broadcast stopped!\nRestart it with /start_auto\nOne-shot broadcast: /broadcast"
                .to_string(),
        ))
    }

    /// One scheduler tick: silently a no-op when inactive or when either
    /// collection is empty (the task may fire once more after a stop race).
    /// The active flag and emptiness are checked once, at tick start.
    pub async fn run_auto_tick(&self) {
        if !self.auto_active.load(Ordering::SeqCst) {
            return;
        }

        let (message, groups, position, total) = {
            let mut state = self.state.lock().await;
            if state.messages.is_empty() || state.groups.is_empty() {
                return;
            }
            if state.rotation_index >= state.messages.len() {
                state.rotation_index = 0;
            }
            (
                state.messages[state.rotation_index].clone(),
                state.groups.clone(),
                state.rotation_index,
                state.messages.len(),
            )
        };

        info!(
            message_id = message.id,
            position = position + 1,
            total,
            "Auto-broadcast tick"
        );

        let mut successes = 0usize;
        for group in &groups {
            match self.send_to_group(&message, group).await {
                Ok(()) => successes += 1,
                Err(e) => {
                    warn!(
                        error = %e,
                        chat_id = group.chat_id,
                        title = %group.title,
                        "Auto-broadcast send failed"
                    );
                }
            }
            tokio::time::sleep(self.pacing).await;
        }

        {
            let mut state = self.state.lock().await;
            state.rotation_index = if state.messages.is_empty() {
                0
            } else {
                (state.rotation_index + 1) % state.messages.len()
            };
        }

        info!(
            successes,
            total_groups = groups.len(),
            "Auto-broadcast tick finished"
        );
    }
}
