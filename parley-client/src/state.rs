use crate::model::{Attributes, ConversationSid, Message, MessageSid};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedState = Arc<RwLock<AppState>>;

/// Downloaded attachment payload.
pub type Blob = Arc<Vec<u8>>;

/// Oldest notifications are dropped past this many.
const MAX_NOTIFICATIONS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Process-wide UI state shared by every conversation view.
#[derive(Debug, Default)]
pub struct AppState {
    /// Conversation -> loaded messages, ascending by index with pending ones last
    pub messages: HashMap<ConversationSid, Vec<Message>>,
    /// Conversation -> message -> downloaded payload
    pub attachments: HashMap<ConversationSid, HashMap<MessageSid, Blob>>,
    pub notifications: VecDeque<Notification>,
    next_notification_id: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn has_conversation(&self, convo: &ConversationSid) -> bool {
        self.messages.contains_key(convo)
    }

    pub fn messages(&self, convo: &ConversationSid) -> &[Message] {
        self.messages.get(convo).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Merges a batch into the conversation history.
    ///
    /// A message whose sid is already present replaces the stored copy (this
    /// is how an optimistic message is confirmed). The result is re-sorted by
    /// index; the sort is stable so pending messages keep their send order.
    pub fn add_messages(&mut self, convo: &ConversationSid, batch: Vec<Message>) {
        let history = self.messages.entry(convo.clone()).or_default();
        for message in batch {
            if let Some(existing) = history.iter_mut().find(|m| m.sid == message.sid) {
                *existing = message;
            } else {
                history.push(message);
            }
        }
        history.sort_by_key(|m| m.index);
    }

    pub fn remove_message(&mut self, convo: &ConversationSid, sid: &MessageSid) -> bool {
        if let Some(attachments) = self.attachments.get_mut(convo) {
            attachments.remove(sid);
        }
        let Some(history) = self.messages.get_mut(convo) else {
            return false;
        };
        let before = history.len();
        history.retain(|m| &m.sid != sid);
        history.len() != before
    }

    pub fn set_message_attributes(
        &mut self,
        convo: &ConversationSid,
        sid: &MessageSid,
        attributes: Attributes,
    ) {
        if let Some(message) = self
            .messages
            .get_mut(convo)
            .and_then(|history| history.iter_mut().find(|m| &m.sid == sid))
        {
            message.attributes = attributes;
        }
    }

    pub fn attachment(&self, convo: &ConversationSid, sid: &MessageSid) -> Option<Blob> {
        self.attachments.get(convo)?.get(sid).cloned()
    }

    pub fn add_attachment(&mut self, convo: &ConversationSid, sid: &MessageSid, blob: Blob) {
        self.attachments
            .entry(convo.clone())
            .or_default()
            .insert(sid.clone(), blob);
    }

    pub fn add_notification(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notifications.push_back(Notification {
            id,
            kind,
            message: message.into(),
        });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        id
    }

    pub fn dismiss_notification(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }
}
