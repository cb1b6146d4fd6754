//! Command router: parses inbound text into commands, dispatches to the
//! handlers, and turns every outcome (including failures) into a short
//! user-visible reply through the gateway.

use std::sync::Arc;

use bcast_core::{BcastError, CommandError, Event, Group, Payload, Result};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::state::Engine;

/// The command surface exposed to the front end. Arguments are kept raw;
/// handlers validate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    AddMessage,
    SkipPhoto,
    ListMessages,
    DeleteMessage(Option<String>),
    Broadcast,
    StartAuto,
    StopAuto,
    AddAdmin(Option<String>),
    Status,
}

impl Command {
    /// Parses `/name arg` with an optional `@botname` suffix on the name.
    /// Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Command> {
        let rest = text.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next()?;
        let name = name.split('@').next().unwrap_or(name);
        let arg = parts.next().map(|s| s.to_string());

        match name {
            "start" => Some(Command::Start),
            "add_message" => Some(Command::AddMessage),
            "skip_photo" => Some(Command::SkipPhoto),
            "list_messages" => Some(Command::ListMessages),
            "delete_message" => Some(Command::DeleteMessage(arg)),
            "broadcast" => Some(Command::Broadcast),
            "start_auto" => Some(Command::StartAuto),
            "stop_auto" => Some(Command::StopAuto),
            "add_admin" => Some(Command::AddAdmin(arg)),
            "status" => Some(Command::Status),
            _ => None,
        }
    }
}

impl Engine {
    /// Entry point for one inbound event. All command failures are recovered
    /// here: command-level errors reply with their user message, anything
    /// else replies with a generic failure. Nothing escapes to the caller
    /// except a failure to send the reply itself.
    #[instrument(skip(self, event), fields(user_id = event.user_id, chat_id = event.chat.id))]
    pub async fn handle_event(self: &Arc<Self>, event: Event) -> Result<()> {
        let outcome = match &event.payload {
            Payload::Text(text) => match Command::parse(text) {
                Some(command) => {
                    info!(command = ?command, "Handling command");
                    self.dispatch(command, &event).await
                }
                // Unknown commands are dropped; slash-prefixed text must
                // never be captured as compose text.
                None if text.trim_start().starts_with('/') => {
                    info!("Ignoring unknown command");
                    Ok(None)
                }
                None => self.handle_text(&event, text).await,
            },
            Payload::Photo(bytes) => self.handle_photo(&event, bytes).await,
        };

        match outcome {
            Ok(Some(reply)) => self.gateway.send_text(event.chat.id, &reply).await,
            Ok(None) => Ok(()),
            Err(BcastError::Command(e)) => {
                warn!(error = %e, "Command rejected");
                self.gateway
                    .send_text(event.chat.id, &e.user_message())
                    .await
            }
            Err(e) => {
                error!(error = %e, "Command failed");
                self.gateway
                    .send_text(event.chat.id, "Something went wrong. Please try again.")
                    .await
            }
        }
    }

    async fn dispatch(self: &Arc<Self>, command: Command, event: &Event) -> Result<Option<String>> {
        match command {
            Command::Start => self.cmd_start(event).await,
            Command::AddMessage => self.cmd_add_message(event).await,
            Command::SkipPhoto => self.cmd_skip_photo(event).await,
            Command::ListMessages => self.cmd_list_messages(event.user_id).await,
            Command::DeleteMessage(arg) => {
                self.cmd_delete_message(event.user_id, arg.as_deref()).await
            }
            Command::Broadcast => self.broadcast_all(event.user_id, event.chat.id).await,
            Command::StartAuto => self.cmd_start_auto(event.user_id).await,
            Command::StopAuto => self.cmd_stop_auto(event.user_id).await,
            Command::AddAdmin(arg) => self.cmd_add_admin(event.user_id, arg.as_deref()).await,
            Command::Status => self.cmd_status(event.user_id).await,
        }
    }

    /// `/start`: registers the calling group, bootstraps the first admin, or
    /// greets the user depending on context.
    async fn cmd_start(&self, event: &Event) -> Result<Option<String>> {
        if event.chat.is_group {
            let mut state = self.state.lock().await;
            if state.groups.iter().any(|g| g.chat_id == event.chat.id) {
                return Ok(Some(
                    "This group is already registered for broadcasts.".to_string(),
                ));
            }
            let title = event.chat.title.clone().unwrap_or_default();
            state.groups.push(Group {
                chat_id: event.chat.id,
                title: title.clone(),
                added_at: Utc::now(),
            });
            self.persist_groups(&state.groups);
            info!(chat_id = event.chat.id, title = %title, "Registered group");
            return Ok(Some(format!(
                "Group '{}' registered for broadcasts!\nGroup id: {}\n\nAdmins can now broadcast to this group.",
                title, event.chat.id
            )));
        }

        let mut state = self.state.lock().await;
        if state.admins.is_empty() {
            let id = event.user_id.to_string();
            state.admins.push(id);
            self.persist_admins(&state.admins);
            info!(user_id = event.user_id, "Bootstrapped first admin");
            return Ok(Some(format!(
                "Welcome! You are the first user, so you are now the admin.\nYour user id: {}\n\nYou can now add messages for broadcasting.",
                event.user_id
            )));
        }

        let id = event.user_id.to_string();
        if state.admins.iter().any(|a| a == &id) {
            let auto = if self.auto_active() { "ON" } else { "OFF" };
            Ok(Some(format!(
                "Welcome back, admin!\n\nStats:\nMessages: {}\nGroups: {}\nAuto-broadcast: {}\n\nCommands:\n\
                 /add_message - store a message (text + optional photo)\n\
                 /list_messages - list stored messages\n\
                 /delete_message <id> - delete a message\n\
                 /broadcast - one-shot broadcast of all messages\n\
                 /start_auto - start auto-broadcast\n\
                 /stop_auto - stop auto-broadcast\n\
                 /add_admin <user_id> - add an admin\n\
                 /status - bot status\n\n\
                 To add a message:\n1. /add_message\n2. Send the text\n3. Send a photo (optional, or /skip_photo)",
                state.messages.len(),
                state.groups.len(),
                auto
            )))
        } else {
            Ok(Some(format!(
                "You do not have admin rights.\nYour user id: {}\nCurrent admins: {}\nAsk an admin to add you.",
                event.user_id,
                state.admins.join(", ")
            )))
        }
    }

    async fn cmd_list_messages(&self, user_id: i64) -> Result<Option<String>> {
        self.require_admin(user_id).await?;

        let state = self.state.lock().await;
        if state.messages.is_empty() {
            return Ok(Some("No stored messages.".to_string()));
        }

        let mut response = String::from("Stored broadcast messages:\n\n");
        for message in &state.messages {
            let photo = if message.has_image { "yes" } else { "no" };
            let mut text: String = message.text.chars().take(80).collect();
            if message.text.chars().count() > 80 {
                text.push_str("...");
            }
            response.push_str(&format!(
                "id: {}\ntext: {}\nphoto: {}\ndate: {}\n------------------------------\n",
                message.id,
                text,
                photo,
                message.created_at.format("%Y-%m-%d")
            ));
        }
        response.push_str(
            "\nDelete with /delete_message <id>\nBroadcast with /broadcast\nAuto-broadcast with /start_auto",
        );
        Ok(Some(response))
    }

    async fn cmd_delete_message(&self, user_id: i64, arg: Option<&str>) -> Result<Option<String>> {
        self.require_admin(user_id).await?;

        let arg = arg.ok_or_else(|| {
            CommandError::InvalidArgument(
                "Usage: /delete_message <id>\nList messages with /list_messages".to_string(),
            )
        })?;
        let id: u64 = arg.parse().map_err(|_| {
            CommandError::InvalidArgument("The message id must be a number.".to_string())
        })?;

        let mut state = self.state.lock().await;
        let Some(position) = state.messages.iter().position(|m| m.id == id) else {
            return Err(CommandError::MessageNotFound(id).into());
        };
        state.messages.remove(position);
        self.persist_messages(&state.messages);
        if state.rotation_index >= state.messages.len() {
            state.rotation_index = 0;
        }
        info!(id, "Deleted message");
        Ok(Some(format!("Message {} deleted.", id)))
    }

    async fn cmd_status(&self, user_id: i64) -> Result<Option<String>> {
        self.require_admin(user_id).await?;

        let state = self.state.lock().await;
        let broadcast = if self.broadcast_in_progress() {
            "ACTIVE"
        } else {
            "IDLE"
        };
        let auto = if self.auto_active() { "ON" } else { "OFF" };
        let with_photo = state.messages.iter().filter(|m| m.has_image).count();
        let position = if state.messages.is_empty() {
            0
        } else {
            state.rotation_index + 1
        };

        Ok(Some(format!(
            "Bot status:\n\nBroadcast: {}\nAuto-broadcast: {}\nInterval: every {} seconds\nMessages: {}\nWith photo: {}\nCurrent rotation: {}/{}\nGroups: {}\nAdmins: {}",
            broadcast,
            auto,
            self.auto_interval.as_secs(),
            state.messages.len(),
            with_photo,
            position,
            state.messages.len(),
            state.groups.len(),
            state.admins.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/add_message"), Some(Command::AddMessage));
        assert_eq!(Command::parse("/broadcast"), Some(Command::Broadcast));
        assert_eq!(Command::parse("/status"), Some(Command::Status));
    }

    #[test]
    fn test_parse_with_argument() {
        assert_eq!(
            Command::parse("/delete_message 3"),
            Some(Command::DeleteMessage(Some("3".to_string())))
        );
        assert_eq!(
            Command::parse("/add_admin 12345"),
            Some(Command::AddAdmin(Some("12345".to_string())))
        );
        assert_eq!(
            Command::parse("/delete_message"),
            Some(Command::DeleteMessage(None))
        );
    }

    #[test]
    fn test_parse_with_botname_suffix() {
        assert_eq!(Command::parse("/start@my_bot"), Some(Command::Start));
        assert_eq!(
            Command::parse("/broadcast@my_bot"),
            Some(Command::Broadcast)
        );
    }

    #[test]
    fn test_parse_non_commands() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("/"), None);
    }
}
