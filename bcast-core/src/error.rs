use thiserror::Error;

#[derive(Error, Debug)]
pub enum BcastError {
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Command-level failures. Each maps to a short user-visible reply via
/// [`CommandError::user_message`]; none of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Broadcast already in progress")]
    BroadcastInProgress,

    #[error("No messages stored")]
    NoMessages,

    #[error("No groups registered")]
    NoGroups,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Message {0} not found")]
    MessageNotFound(u64),

    #[error("Compose session out of order")]
    ComposeOutOfOrder,

    #[error("No active compose session")]
    NoComposeSession,
}

impl CommandError {
    /// Reply text shown to the user when the command fails.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::PermissionDenied => {
                "You do not have permission to use this command.".to_string()
            }
            CommandError::BroadcastInProgress => {
                "A broadcast is already in progress. Please wait for it to finish.".to_string()
            }
            CommandError::NoMessages => {
                "There are no messages to broadcast.\nAdd one first with /add_message".to_string()
            }
            CommandError::NoGroups => {
                "There are no groups to broadcast to.\nAdd the bot to a group and send /start there."
                    .to_string()
            }
            CommandError::InvalidArgument(usage) => usage.clone(),
            CommandError::MessageNotFound(id) => {
                format!("Message with id {} was not found.", id)
            }
            CommandError::ComposeOutOfOrder => {
                "Send the message text first.".to_string()
            }
            CommandError::NoComposeSession => {
                "No message is being composed. Start with /add_message".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BcastError>;
