//! Error types surfaced by session, mailbox and compose operations

use crate::gateway::GatewayError;

/// Errors surfaced to the caller of a state operation
///
/// Every error is scoped to the operation that produced it. Stores keep the
/// latest message for display and clear it when the operation is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// Local input check failed before any network call
    #[error("{message}")]
    Validation { message: String },

    /// The backend rejected a login, signup or restore
    #[error("{message}")]
    Auth { message: String },

    /// The backend could not be reached or answered with garbage
    #[error("Network error: {message}")]
    Transport { message: String },

    /// The backend refused or failed a send; the draft is kept
    #[error("{message}")]
    Send { message: String },

    /// A send is already outstanding
    #[error("A message is already being sent")]
    SendInFlight,

    /// The session was reset while a send was outstanding; its result was dropped
    #[error("Session ended before the send completed")]
    SendDiscarded,

    /// The operation needs an authenticated session
    #[error("Not logged in")]
    NotAuthenticated,

    /// The persisted credential slot could not be read or written
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl MailError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Map a gateway failure from an auth call, with a fallback message
    pub fn from_auth(err: GatewayError, fallback: &str) -> Self {
        match err {
            GatewayError::Rejected { message, .. } => Self::Auth {
                message: message.unwrap_or_else(|| fallback.to_string()),
            },
            GatewayError::Transport(message) | GatewayError::Malformed(message) => {
                Self::Transport { message }
            }
        }
    }

    /// Map a gateway failure from a send call
    pub fn from_send(err: GatewayError) -> Self {
        let message = match err {
            GatewayError::Rejected { message, .. } => {
                message.unwrap_or_else(|| "Send failed".to_string())
            }
            GatewayError::Transport(message) | GatewayError::Malformed(message) => message,
        };
        Self::Send { message }
    }
}

impl From<anyhow::Error> for MailError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage {
            message: format!("{:#}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
