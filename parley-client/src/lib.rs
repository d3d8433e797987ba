pub mod attachments;
pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod sdk;
pub mod state;

use crate::attachments::fetch_blob;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::model::{
    Attributes, ConversationSid, Message, MessageIndex, Participant, reactions_attribute,
    toggle_reaction,
};
use crate::sdk::{Conversation, MessagePage};
use crate::state::{Blob, NotificationKind, SharedState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

pub const MESSAGE_DELETED: &str = "Message deleted.";
pub const UNEXPECTED_ERROR: &str = "Something went wrong. Please try again.";

/// Result of a page fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFetch {
    /// Messages merged into the store by this fetch, ascending.
    pub messages: Vec<Message>,
    pub has_older: bool,
}

#[derive(Default)]
struct Pagination {
    cursor: Option<Arc<dyn MessagePage>>,
    has_older: bool,
    reported_read: Option<MessageIndex>,
}

/// Releases the in-flight flag when the fetch finishes, whatever the outcome.
struct FetchGuard<'a>(&'a AtomicBool);

impl<'a> FetchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps one conversation's message history in the shared store.
///
/// Pages come from the conversation's pagination cursor and are merged into
/// [`state::AppState`]; the store also caches downloaded attachments and
/// receives user-facing notifications.
pub struct MessageStore<C: Conversation + 'static> {
    conversation: Arc<C>,
    state: SharedState,
    page_size: usize,
    pagination: Mutex<Pagination>,
    fetching: AtomicBool,
}

impl<C: Conversation + 'static> MessageStore<C> {
    pub fn new(conversation: Arc<C>, state: SharedState) -> Self {
        Self::with_config(conversation, state, &ClientConfig::default())
    }

    pub fn with_config(conversation: Arc<C>, state: SharedState, config: &ClientConfig) -> Self {
        Self {
            conversation,
            state,
            page_size: config.page_size.max(1),
            pagination: Mutex::new(Pagination::default()),
            fetching: AtomicBool::new(false),
        }
    }

    pub fn conversation(&self) -> &Arc<C> {
        &self.conversation
    }

    pub fn conversation_sid(&self) -> &ConversationSid {
        self.conversation.sid()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Snapshot of the loaded history, ascending.
    pub async fn messages(&self) -> Vec<Message> {
        self.state
            .read()
            .await
            .messages(self.conversation.sid())
            .to_vec()
    }

    pub async fn has_older(&self) -> bool {
        self.pagination.lock().await.has_older
    }

    /// Whether an older-page fetch is currently outstanding.
    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Fetches the newest page, resets the cursor and merges the page into the store.
    pub async fn fetch_initial(&self) -> ClientResult<PageFetch> {
        let sid = self.conversation.sid();
        debug!("Fetching latest {} messages of {}", self.page_size, sid);
        let page: Arc<dyn MessagePage> =
            Arc::from(self.conversation.get_messages(self.page_size).await?);
        let messages = page.items().to_vec();
        let has_older = page.has_prev_page();
        {
            let mut pagination = self.pagination.lock().await;
            pagination.cursor = Some(page);
            pagination.has_older = has_older;
        }
        self.state
            .write()
            .await
            .add_messages(sid, messages.clone());
        info!(
            "Loaded {} messages for {} (older available: {})",
            messages.len(),
            sid,
            has_older
        );
        Ok(PageFetch {
            messages,
            has_older,
        })
    }

    /// Performs the initial fetch unless the store already holds this conversation.
    ///
    /// Returns `None` when nothing was fetched.
    pub async fn load_messages(&self) -> ClientResult<Option<PageFetch>> {
        if self
            .state
            .read()
            .await
            .has_conversation(self.conversation.sid())
        {
            return Ok(None);
        }
        self.fetch_initial().await.map(Some)
    }

    /// Fetches the page before the current cursor and prepends it to the history.
    ///
    /// Does nothing when no older messages are advertised, when no cursor has
    /// been obtained yet, or while another older-page fetch is outstanding. A
    /// cursor answering with nothing, or with an empty page, ends pagination.
    pub async fn fetch_older(&self) -> ClientResult<PageFetch> {
        let sid = self.conversation.sid();
        let Some(_guard) = FetchGuard::acquire(&self.fetching) else {
            debug!("Older page of {} already being fetched", sid);
            return Ok(PageFetch {
                messages: Vec::new(),
                has_older: true,
            });
        };

        let cursor = {
            let pagination = self.pagination.lock().await;
            if !pagination.has_older {
                return Ok(PageFetch::default());
            }
            match &pagination.cursor {
                Some(cursor) => cursor.clone(),
                None => return Ok(PageFetch::default()),
            }
        };

        let Some(page) = cursor.prev_page().await? else {
            debug!("No older page returned for {}, stopping pagination", sid);
            self.pagination.lock().await.has_older = false;
            return Ok(PageFetch::default());
        };
        if page.items().is_empty() {
            debug!("Empty older page returned for {}, stopping pagination", sid);
            self.pagination.lock().await.has_older = false;
            return Ok(PageFetch::default());
        }

        let page: Arc<dyn MessagePage> = Arc::from(page);
        let messages = page.items().to_vec();
        let has_older = page.has_prev_page();
        {
            let mut pagination = self.pagination.lock().await;
            pagination.cursor = Some(page);
            pagination.has_older = has_older;
        }
        self.state
            .write()
            .await
            .add_messages(sid, messages.clone());
        debug!(
            "Prepended {} older messages to {} (older available: {})",
            messages.len(),
            sid,
            has_older
        );
        Ok(PageFetch {
            messages,
            has_older,
        })
    }

    pub async fn cached_attachment(&self, message: &Message) -> Option<Blob> {
        self.state
            .read()
            .await
            .attachment(self.conversation.sid(), &message.sid)
    }

    /// Returns the attachment bytes of `message`, downloading them on first use.
    ///
    /// `Ok(None)` means the download failed; the user has already been notified.
    pub async fn download_attachment(&self, message: &Message) -> ClientResult<Option<Blob>> {
        let media = message
            .media
            .as_ref()
            .ok_or_else(|| ClientError::MissingMedia(message.sid.clone()))?;
        if let Some(blob) = self.cached_attachment(message).await {
            debug!("Attachment of {} served from cache", message.sid);
            return Ok(Some(blob));
        }
        let Some(blob) = fetch_blob(self.conversation.as_ref(), media, &self.state).await else {
            return Ok(None);
        };
        self.state
            .write()
            .await
            .add_attachment(self.conversation.sid(), &message.sid, blob.clone());
        Ok(Some(blob))
    }

    /// Deletes a message and reports the outcome as a notification.
    pub async fn delete_message(&self, message: &Message) -> bool {
        let sid = self.conversation.sid();
        match self.conversation.remove_message(&message.sid).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.remove_message(sid, &message.sid);
                state.add_notification(NotificationKind::Success, MESSAGE_DELETED);
                info!("Deleted message {} from {}", message.sid, sid);
                true
            }
            Err(e) => {
                error!("Failed to delete message {}: {}", message.sid, e);
                self.state
                    .write()
                    .await
                    .add_notification(NotificationKind::Error, UNEXPECTED_ERROR);
                false
            }
        }
    }

    /// Merges `patch` over the message's attributes and writes the result back.
    pub async fn update_attributes(&self, message: &Message, patch: Attributes) -> ClientResult<()> {
        let mut attributes = message.attributes.clone();
        attributes.extend(patch);
        self.conversation
            .update_message_attributes(&message.sid, attributes.clone())
            .await?;
        self.state.write().await.set_message_attributes(
            self.conversation.sid(),
            &message.sid,
            attributes,
        );
        Ok(())
    }

    pub async fn toggle_reaction(
        &self,
        message: &Message,
        emoji: &str,
        username: &str,
    ) -> ClientResult<()> {
        let mut reactions = message.reactions();
        toggle_reaction(&mut reactions, emoji, username);
        self.update_attributes(message, reactions_attribute(&reactions))
            .await
    }

    /// Reports the newest confirmed message as read.
    ///
    /// Returns the index reported, or `None` if there was nothing new to report.
    pub async fn mark_read(&self) -> ClientResult<Option<MessageIndex>> {
        let newest = self
            .state
            .read()
            .await
            .messages(self.conversation.sid())
            .iter()
            .rev()
            .map(|m| m.index)
            .find(|idx| !idx.is_pending());
        let Some(newest) = newest else {
            return Ok(None);
        };
        let mut pagination = self.pagination.lock().await;
        if pagination.reported_read == Some(newest) {
            return Ok(None);
        }
        self.conversation
            .update_last_read_message_index(newest)
            .await?;
        pagination.reported_read = Some(newest);
        Ok(Some(newest))
    }

    pub async fn participants(&self) -> ClientResult<Vec<Participant>> {
        Ok(self.conversation.participants().await?)
    }
}
