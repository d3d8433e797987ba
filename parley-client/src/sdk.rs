//! The fixed interface to the external messaging service.
//!
//! Parley never talks to a transport directly: everything it needs from the
//! service (paginated history, mutations, media payloads, read horizons) goes
//! through these traits.

use crate::error::SdkResult;
use crate::model::{
    Attributes, ConversationSid, Media, Message, MessageIndex, MessageSid, Participant,
};
use async_trait::async_trait;

/// A page of messages plus the cursor to the page before it.
#[async_trait]
pub trait MessagePage: Send + Sync {
    /// Messages in ascending index order.
    fn items(&self) -> &[Message];

    /// Whether older messages exist before this page.
    fn has_prev_page(&self) -> bool;

    /// Fetches the page immediately older than this one.
    async fn prev_page(&self) -> SdkResult<Option<Box<dyn MessagePage>>>;
}

#[async_trait]
pub trait Conversation: Send + Sync {
    fn sid(&self) -> &ConversationSid;

    /// Fetches the newest `page_size` messages.
    async fn get_messages(&self, page_size: usize) -> SdkResult<Box<dyn MessagePage>>;

    async fn update_last_read_message_index(&self, index: MessageIndex) -> SdkResult<()>;

    async fn remove_message(&self, sid: &MessageSid) -> SdkResult<()>;

    /// Replaces the attribute map of a message.
    async fn update_message_attributes(
        &self,
        sid: &MessageSid,
        attributes: Attributes,
    ) -> SdkResult<()>;

    /// Downloads the binary payload of `media`.
    async fn fetch_media(&self, media: &Media) -> SdkResult<Vec<u8>>;

    async fn participants(&self) -> SdkResult<Vec<Participant>>;
}
