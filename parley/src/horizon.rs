//! The read horizon: the divider between read and unread messages.

use parley_client::model::{Message, MessageIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    /// Number of unread messages
    pub amount: usize,
    /// Index of the oldest unread message; the divider is drawn right before it
    pub first_index: MessageIndex,
}

impl Horizon {
    pub fn label(&self) -> String {
        match self.amount {
            1 => "1 new message".to_string(),
            n => format!("{n} new messages"),
        }
    }
}

/// Computes the horizon for `messages` (ascending) given the last index the
/// user has read. There is none when `last_read` is -1 or nothing is unread.
pub fn compute_horizon(messages: &[Message], last_read: MessageIndex) -> Option<Horizon> {
    if last_read.is_pending() {
        return None;
    }
    let mut unread = messages
        .iter()
        .filter(|m| !m.index.is_pending() && m.index.0 > last_read.0);
    let first_index = unread.next()?.index;
    Some(Horizon {
        amount: 1 + unread.count(),
        first_index,
    })
}

/// The last-read index the list should use: none (-1) when the newest
/// message was written by the current user, since they have evidently seen
/// everything before it.
pub fn effective_last_read_index(
    messages: &[Message],
    last_read: MessageIndex,
    own_username: Option<&str>,
) -> MessageIndex {
    match messages.last() {
        Some(newest) if own_username != Some(newest.author.as_str()) => last_read,
        _ => MessageIndex::PENDING,
    }
}

/// Horizon bookkeeping for one mount of the list.
///
/// The horizon is computed once, the first time there is something unread,
/// and is then frozen so that messages arriving later do not move it. It is
/// scrolled into view once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HorizonTracker {
    horizon: Option<Horizon>,
    scrolled_into_view: bool,
}

impl HorizonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, messages: &[Message], last_read: MessageIndex) {
        if self.horizon.is_none() {
            self.horizon = compute_horizon(messages, last_read);
        }
    }

    pub fn horizon(&self) -> Option<Horizon> {
        self.horizon
    }

    pub fn needs_scroll(&self) -> bool {
        self.horizon.is_some() && !self.scrolled_into_view
    }

    pub fn mark_scrolled(&mut self) {
        self.scrolled_into_view = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parley_client::model::{Attributes, MessageSid};

    fn msg(index: i64, author: &str) -> Message {
        Message {
            sid: MessageSid(format!("IM{index}")),
            index: MessageIndex(index),
            author: author.to_string(),
            body: Some("hey".to_string()),
            media: None,
            date_created: Utc::now(),
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn test_horizon_before_first_unread() {
        let messages: Vec<_> = (0..6).map(|i| msg(i, "bob")).collect();
        let horizon = compute_horizon(&messages, MessageIndex(3)).unwrap();
        assert_eq!(horizon.amount, 2);
        assert_eq!(horizon.first_index, MessageIndex(4));
        assert_eq!(horizon.label(), "2 new messages");
    }

    #[test]
    fn test_no_horizon_without_last_read() {
        let messages: Vec<_> = (0..3).map(|i| msg(i, "bob")).collect();
        assert_eq!(compute_horizon(&messages, MessageIndex::PENDING), None);
    }

    #[test]
    fn test_no_horizon_when_all_read() {
        let messages: Vec<_> = (0..3).map(|i| msg(i, "bob")).collect();
        assert_eq!(compute_horizon(&messages, MessageIndex(2)), None);
    }

    #[test]
    fn test_pending_messages_are_not_unread() {
        let messages = vec![msg(0, "bob"), msg(-1, "me")];
        assert_eq!(compute_horizon(&messages, MessageIndex(0)), None);
    }

    #[test]
    fn test_effective_last_read_when_own_message_is_newest() {
        let messages = vec![msg(0, "bob"), msg(1, "me")];
        assert_eq!(
            effective_last_read_index(&messages, MessageIndex(0), Some("me")),
            MessageIndex::PENDING
        );
        assert_eq!(
            effective_last_read_index(&messages, MessageIndex(0), Some("bob")),
            MessageIndex(0)
        );
    }

    #[test]
    fn test_tracker_freezes_first_horizon() {
        let mut messages: Vec<_> = (0..4).map(|i| msg(i, "bob")).collect();
        let mut tracker = HorizonTracker::new();
        tracker.observe(&messages, MessageIndex(2));
        assert_eq!(tracker.horizon().map(|h| h.amount), Some(1));

        messages.push(msg(4, "bob"));
        tracker.observe(&messages, MessageIndex(2));
        assert_eq!(tracker.horizon().map(|h| h.amount), Some(1));

        assert!(tracker.needs_scroll());
        tracker.mark_scrolled();
        assert!(!tracker.needs_scroll());
    }
}
