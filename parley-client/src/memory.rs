//! In-memory conversation backend.
//!
//! Implements [`Conversation`] over a message vector so the adapter and the
//! renderer can run without a messaging service. Request counters and failure
//! switches make it usable as a test double.

use crate::error::{ClientError, ClientResult, SdkError, SdkResult};
use crate::model::{
    Attributes, ConversationSid, Media, Message, MessageIndex, MessageSid, Participant,
};
use crate::sdk::{Conversation, MessagePage};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct Inner {
    messages: Mutex<Vec<Message>>,
    media: Mutex<HashMap<String, Vec<u8>>>,
    participants: Mutex<Vec<Participant>>,
    last_read: Mutex<Option<MessageIndex>>,
    page_requests: AtomicUsize,
    media_requests: AtomicUsize,
    fail_media: AtomicBool,
    fail_remove: AtomicBool,
    exhaust_pages: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct MemoryConversation {
    sid: ConversationSid,
    inner: Arc<Inner>,
}

/// On-disk form of a conversation, used by the demo binary.
#[derive(Debug, Deserialize)]
pub struct Transcript {
    pub sid: ConversationSid,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Media sid -> base64 payload
    #[serde(default)]
    pub media: HashMap<String, String>,
}

impl MemoryConversation {
    pub fn new(sid: impl Into<ConversationSid>) -> Self {
        Self {
            sid: sid.into(),
            inner: Arc::new(Inner::default()),
        }
    }

    pub fn from_transcript(json: &str) -> ClientResult<Self> {
        let transcript: Transcript = serde_json::from_str(json)?;
        let convo = Self::new(transcript.sid);
        for (media_sid, encoded) in transcript.media {
            let data = BASE64.decode(encoded.trim()).map_err(|e| {
                ClientError::Other(format!("Invalid payload for media {media_sid}: {e}"))
            })?;
            convo.put_media(&media_sid, data);
        }
        convo.set_participants(transcript.participants);
        convo.push_messages(transcript.messages);
        Ok(convo)
    }

    pub fn push_message(&self, message: Message) {
        self.push_messages(vec![message]);
    }

    pub fn push_messages(&self, messages: Vec<Message>) {
        let mut stored = self.inner.messages.lock();
        stored.extend(messages);
        stored.sort_by_key(|m| m.index);
    }

    pub fn put_media(&self, media_sid: &str, data: Vec<u8>) {
        self.inner.media.lock().insert(media_sid.to_string(), data);
    }

    pub fn set_participants(&self, participants: Vec<Participant>) {
        *self.inner.participants.lock() = participants;
    }

    pub fn stored_messages(&self) -> Vec<Message> {
        self.inner.messages.lock().clone()
    }

    pub fn last_read_index(&self) -> Option<MessageIndex> {
        *self.inner.last_read.lock()
    }

    /// Number of page requests served, initial and older.
    pub fn page_requests(&self) -> usize {
        self.inner.page_requests.load(Ordering::SeqCst)
    }

    pub fn media_requests(&self) -> usize {
        self.inner.media_requests.load(Ordering::SeqCst)
    }

    pub fn fail_media(&self, fail: bool) {
        self.inner.fail_media.store(fail, Ordering::SeqCst);
    }

    pub fn fail_remove(&self, fail: bool) {
        self.inner.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Makes older-page requests answer with nothing while still advertising more pages.
    pub fn exhaust_pages(&self, exhaust: bool) {
        self.inner.exhaust_pages.store(exhaust, Ordering::SeqCst);
    }

    fn page_ending_at(&self, end: usize, page_size: usize) -> MemoryPage {
        let messages = self.inner.messages.lock();
        let end = end.min(messages.len());
        let start = end.saturating_sub(page_size);
        MemoryPage {
            conversation: self.clone(),
            items: messages[start..end].to_vec(),
            start,
            page_size,
        }
    }
}

pub struct MemoryPage {
    conversation: MemoryConversation,
    items: Vec<Message>,
    /// Position of the first item in the backing vector
    start: usize,
    page_size: usize,
}

#[async_trait]
impl MessagePage for MemoryPage {
    fn items(&self) -> &[Message] {
        &self.items
    }

    fn has_prev_page(&self) -> bool {
        self.start > 0
    }

    async fn prev_page(&self) -> SdkResult<Option<Box<dyn MessagePage>>> {
        let inner = &self.conversation.inner;
        inner.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.start == 0 || inner.exhaust_pages.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(Box::new(
            self.conversation.page_ending_at(self.start, self.page_size),
        )))
    }
}

#[async_trait]
impl Conversation for MemoryConversation {
    fn sid(&self) -> &ConversationSid {
        &self.sid
    }

    async fn get_messages(&self, page_size: usize) -> SdkResult<Box<dyn MessagePage>> {
        self.inner.page_requests.fetch_add(1, Ordering::SeqCst);
        let len = self.inner.messages.lock().len();
        Ok(Box::new(self.page_ending_at(len, page_size)))
    }

    async fn update_last_read_message_index(&self, index: MessageIndex) -> SdkResult<()> {
        *self.inner.last_read.lock() = Some(index);
        Ok(())
    }

    async fn remove_message(&self, sid: &MessageSid) -> SdkResult<()> {
        if self.inner.fail_remove.load(Ordering::SeqCst) {
            return Err(SdkError::PermissionDenied(format!("cannot remove {sid}")));
        }
        let mut messages = self.inner.messages.lock();
        let before = messages.len();
        messages.retain(|m| &m.sid != sid);
        if messages.len() == before {
            return Err(SdkError::MessageNotFound(sid.clone()));
        }
        Ok(())
    }

    async fn update_message_attributes(
        &self,
        sid: &MessageSid,
        attributes: Attributes,
    ) -> SdkResult<()> {
        let mut messages = self.inner.messages.lock();
        let message = messages
            .iter_mut()
            .find(|m| &m.sid == sid)
            .ok_or_else(|| SdkError::MessageNotFound(sid.clone()))?;
        message.attributes = attributes;
        Ok(())
    }

    async fn fetch_media(&self, media: &Media) -> SdkResult<Vec<u8>> {
        self.inner.media_requests.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_media.load(Ordering::SeqCst) {
            return Err(SdkError::Transport("media download interrupted".to_string()));
        }
        self.inner
            .media
            .lock()
            .get(&media.sid)
            .cloned()
            .ok_or_else(|| SdkError::MediaUnavailable(media.sid.clone()))
    }

    async fn participants(&self) -> SdkResult<Vec<Participant>> {
        Ok(self.inner.participants.lock().clone())
    }
}
