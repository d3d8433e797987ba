use crate::model::{ConversationSid, MessageSid};
use thiserror::Error;

/// Failures reported by the messaging service behind [`crate::sdk::Conversation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationSid),
    #[error("Message not found: {0}")]
    MessageNotFound(MessageSid),
    #[error("Media not available: {0}")]
    MediaUnavailable(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Transport-level failure. Stored as a string because the underlying errors may not be Clone/Eq.
    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Message {0} has no media attached")]
    MissingMedia(MessageSid),
    #[error("Other error: {0}")]
    Other(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
pub type ClientResult<T> = Result<T, ClientError>;
