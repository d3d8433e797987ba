//! The conversation screen: the message list wired to a [`MessageStore`].

use crate::config::Config;
use crate::download::save_attachment;
use crate::error::ViewResult;
use crate::time::{TimeProvider, preview_date};
use crate::widgets::{
    AttachmentState, ImagePreviewModal, MessageList, MessageListState, NotificationBar,
    image_preview::centered_rect,
};
use parley_client::MessageStore;
use parley_client::UNEXPECTED_ERROR;
use parley_client::model::{Message, MessageIndex, MessageSid, Participant};
use parley_client::sdk::Conversation;
use parley_client::state::{Blob, Notification, NotificationKind};
use ratatui::Frame;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::widgets::{Block, Borders, Clear};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const REACTION_EMOJI: &str = "👍";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    None,
    Changed,
    Quit,
}

/// An image attachment open in the preview modal.
#[derive(Debug, Clone)]
pub struct Preview {
    pub message: Message,
    pub blob: Blob,
}

pub struct ConversationView<C: Conversation + 'static> {
    store: Arc<MessageStore<C>>,
    config: Config,
    own_username: Option<String>,
    time: Arc<dyn TimeProvider>,
    downloads_dir: PathBuf,
    pub list_state: MessageListState,
    messages: Vec<Message>,
    participants: Vec<Participant>,
    last_read_index: MessageIndex,
    has_older: bool,
    attachment_states: HashMap<MessageSid, AttachmentState>,
    notification: Option<Notification>,
    preview: Option<Preview>,
}

impl<C: Conversation + 'static> ConversationView<C> {
    pub fn new(
        store: Arc<MessageStore<C>>,
        config: Config,
        own_username: Option<String>,
        time: Arc<dyn TimeProvider>,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            config,
            own_username,
            time,
            downloads_dir,
            list_state: MessageListState::new(),
            messages: Vec::new(),
            participants: Vec::new(),
            last_read_index: MessageIndex::PENDING,
            has_older: false,
            attachment_states: HashMap::new(),
            notification: None,
            preview: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn has_older(&self) -> bool {
        self.has_older
    }

    pub fn attachment_state(&self, sid: &MessageSid) -> AttachmentState {
        self.attachment_states.get(sid).copied().unwrap_or_default()
    }

    /// Loads the conversation, captures the user's read position and reports
    /// the newest message as read.
    pub async fn mount(&mut self) -> ViewResult<()> {
        self.list_state.reset();
        self.store.load_messages().await?;
        self.participants = match self.store.participants().await {
            Ok(participants) => participants,
            Err(e) => {
                warn!("Failed to load participants: {}", e);
                Vec::new()
            }
        };
        self.last_read_index = self
            .own_username
            .as_deref()
            .and_then(|me| self.participants.iter().find(|p| p.identity == me))
            .and_then(|p| p.last_read_message_index)
            .unwrap_or(MessageIndex::PENDING);
        info!(
            "Mounted {} (last read: {})",
            self.store.conversation_sid(),
            self.last_read_index
        );
        self.refresh().await;
        Ok(())
    }

    /// Pulls the latest snapshot out of the shared store and reports the
    /// newest message as read if it changed.
    pub async fn refresh(&mut self) {
        let sid = self.store.conversation_sid().clone();
        {
            let state = self.store.state().read().await;
            self.messages = state.messages(&sid).to_vec();
            self.notification = state.latest_notification().cloned();
            for message in &self.messages {
                if state.attachment(&sid, &message.sid).is_some() {
                    self.attachment_states
                        .insert(message.sid.clone(), AttachmentState::Downloaded);
                }
            }
        }
        self.attachment_states
            .retain(|sid, _| self.messages.iter().any(|m| &m.sid == sid));
        self.has_older = self.store.has_older().await;
        self.mark_read().await;
    }

    async fn mark_read(&self) {
        if let Err(e) = self.store.mark_read().await {
            warn!("Failed to update last read message: {}", e);
        }
    }

    /// Whether the last frame reached the loader row.
    pub fn take_fetch_request(&mut self) -> bool {
        self.list_state.take_fetch_request()
    }

    /// Prepends the next older page.
    pub async fn fetch_more(&mut self) -> ViewResult<()> {
        let fetched = self.store.fetch_older().await?;
        debug!("Fetched {} older messages", fetched.messages.len());
        self.refresh().await;
        Ok(())
    }

    async fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        self.store
            .state()
            .write()
            .await
            .add_notification(kind, message);
    }

    /// Activates the attachment of the selected message: images open in the
    /// preview, anything else is saved to the downloads directory.
    pub async fn open_attachment(&mut self) -> ViewResult<()> {
        let Some(message) = self.list_state.selected_message(&self.messages).cloned() else {
            return Ok(());
        };
        let Some(media) = message.media.clone() else {
            return Ok(());
        };
        if message.is_sending() {
            return Ok(());
        }

        self.attachment_states
            .insert(message.sid.clone(), AttachmentState::Downloading);
        let blob = self.store.download_attachment(&message).await?;
        let Some(blob) = blob else {
            self.attachment_states.remove(&message.sid);
            self.refresh().await;
            return Ok(());
        };
        self.attachment_states
            .insert(message.sid.clone(), AttachmentState::Downloaded);

        if media.is_image() {
            debug!("Opening preview of {}", media.filename);
            self.preview = Some(Preview { message, blob });
        } else {
            self.save_blob(&media.filename, &blob).await;
        }
        self.refresh().await;
        Ok(())
    }

    async fn save_blob(&mut self, filename: &str, blob: &Blob) {
        match save_attachment(&self.downloads_dir, filename, blob.as_slice()).await {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| filename.to_string());
                self.notify(NotificationKind::Success, format!("Saved {name}."))
                    .await;
            }
            Err(e) => {
                error!("Failed to save {}: {}", filename, e);
                self.notify(
                    NotificationKind::Error,
                    format!("Failed to save {filename}."),
                )
                .await;
            }
        }
    }

    /// Saves the previewed image and closes the preview.
    pub async fn save_preview(&mut self) {
        let Some(preview) = self.preview.take() else {
            return;
        };
        if let Some(media) = &preview.message.media {
            self.save_blob(&media.filename, &preview.blob).await;
        }
        self.refresh().await;
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub async fn delete_selected(&mut self) {
        let Some(position) = self.list_state.selected_position(&self.messages) else {
            return;
        };
        let message = self.messages[position].clone();
        if self.store.delete_message(&message).await {
            let neighbour = self
                .messages
                .get(position + 1)
                .or_else(|| position.checked_sub(1).and_then(|i| self.messages.get(i)))
                .map(|m| m.sid.clone());
            self.list_state.select(neighbour);
        }
        self.refresh().await;
    }

    pub async fn toggle_reaction_on_selected(&mut self) {
        let Some(username) = self.own_username.clone() else {
            return;
        };
        let Some(message) = self.list_state.selected_message(&self.messages).cloned() else {
            return;
        };
        if let Err(e) = self
            .store
            .toggle_reaction(&message, REACTION_EMOJI, &username)
            .await
        {
            error!("Failed to update reactions of {}: {}", message.sid, e);
            self.notify(NotificationKind::Error, UNEXPECTED_ERROR).await;
        }
        self.refresh().await;
    }

    async fn dismiss_notification(&mut self) -> bool {
        let Some(notification) = self.notification.take() else {
            return false;
        };
        self.store
            .state()
            .write()
            .await
            .dismiss_notification(notification.id);
        self.refresh().await;
        true
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> ViewResult<Outcome> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Outcome::Quit);
        }

        if self.preview.is_some() {
            return Ok(match key.code {
                KeyCode::Char('s') => {
                    self.save_preview().await;
                    Outcome::Changed
                }
                KeyCode::Esc => {
                    self.close_preview();
                    Outcome::Changed
                }
                _ => Outcome::None,
            });
        }

        let outcome = match key.code {
            KeyCode::Char('q') => Outcome::Quit,
            KeyCode::Up => {
                self.list_state.select_previous(&self.messages);
                Outcome::Changed
            }
            KeyCode::Down => {
                self.list_state.select_next(&self.messages);
                Outcome::Changed
            }
            KeyCode::PageUp => {
                self.list_state.page_up();
                Outcome::Changed
            }
            KeyCode::PageDown => {
                self.list_state.page_down();
                Outcome::Changed
            }
            KeyCode::End => {
                self.list_state.select(None);
                self.list_state.scroll_to_bottom();
                Outcome::Changed
            }
            KeyCode::Enter => {
                self.open_attachment().await?;
                Outcome::Changed
            }
            KeyCode::Char('d') => {
                self.delete_selected().await;
                Outcome::Changed
            }
            KeyCode::Char('r') => {
                self.toggle_reaction_on_selected().await;
                Outcome::Changed
            }
            KeyCode::Esc => {
                if self.dismiss_notification().await {
                    Outcome::Changed
                } else {
                    Outcome::None
                }
            }
            _ => Outcome::None,
        };
        Ok(outcome)
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let now = self.time.now_local();
        let title = format!(" {} ", self.store.conversation_sid());
        let list = MessageList::new(&self.messages)
            .block(Block::default().borders(Borders::ALL).title(title))
            .own_username(self.own_username.as_deref())
            .participants(&self.participants)
            .has_more(self.has_older)
            .last_read_index(self.last_read_index)
            .metrics(self.config.metrics)
            .now(now)
            .attachments(&self.attachment_states)
            .show_scrollbar(self.config.show_scrollbar)
            .focused(self.preview.is_none());
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);
        frame.render_widget(NotificationBar::new(self.notification.as_ref()), chunks[1]);

        if let Some(preview) = &self.preview {
            let Some(media) = &preview.message.media else {
                return;
            };
            let modal = ImagePreviewModal::new(
                media.filename.clone(),
                preview.message.author.clone(),
                preview_date(preview.message.date_created, now),
            )
            .content_type(media.content_type.clone())
            .size(preview.blob.len() as u64);
            let (width, height) = modal.required_size();
            let area = centered_rect(width, height, frame.area());
            frame.render_widget(Clear, area);
            frame.render_widget(modal, area);
        }
    }
}
