use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute key under which reactions are stored on a message.
pub const REACTIONS_ATTRIBUTE: &str = "reactions";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationSid(pub String);

impl fmt::Display for ConversationSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationSid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageSid(pub String);

impl fmt::Display for MessageSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageSid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Position of a message in its conversation.
///
/// Confirmed messages carry a monotonic, non-negative index. A locally created
/// message that the service has not acknowledged yet carries [`MessageIndex::PENDING`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageIndex(pub i64);

impl MessageIndex {
    pub const PENDING: MessageIndex = MessageIndex(-1);

    pub fn is_pending(self) -> bool {
        self == Self::PENDING
    }
}

impl PartialOrd for MessageIndex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending messages sort after every confirmed one.
impl Ord for MessageIndex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.is_pending(), other.is_pending()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for MessageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media attached to a message. The payload itself stays with the service
/// and is retrieved through [`crate::sdk::Conversation::fetch_media`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub sid: String,
    pub content_type: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}

impl Media {
    pub fn is_image(&self) -> bool {
        self.content_type.contains("image")
    }
}

pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Emoji -> usernames that reacted with it.
pub type Reactions = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sid: MessageSid,
    pub index: MessageIndex,
    pub author: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub media: Option<Media>,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Message {
    pub fn is_sending(&self) -> bool {
        self.index.is_pending()
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn has_image(&self) -> bool {
        self.media.as_ref().is_some_and(Media::is_image)
    }

    /// Reactions stored in the attribute map. Malformed entries are skipped.
    pub fn reactions(&self) -> Reactions {
        let mut reactions = Reactions::new();
        let Some(serde_json::Value::Object(map)) = self.attributes.get(REACTIONS_ATTRIBUTE) else {
            return reactions;
        };
        for (emoji, users) in map {
            let users: Vec<String> = users
                .as_array()
                .map(|list| {
                    list.iter()
                        .filter_map(|u| u.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            if !users.is_empty() {
                reactions.insert(emoji.clone(), users);
            }
        }
        reactions
    }
}

/// Adds `username` to the `emoji` reaction, or removes it if already present.
pub fn toggle_reaction(reactions: &mut Reactions, emoji: &str, username: &str) {
    let users = reactions.entry(emoji.to_string()).or_default();
    if let Some(pos) = users.iter().position(|u| u == username) {
        users.remove(pos);
        if users.is_empty() {
            reactions.remove(emoji);
        }
    } else {
        users.push(username.to_string());
    }
}

/// Builds the attribute patch that stores `reactions` on a message.
pub fn reactions_attribute(reactions: &Reactions) -> Attributes {
    let mut map = serde_json::Map::new();
    for (emoji, users) in reactions {
        map.insert(
            emoji.clone(),
            serde_json::Value::Array(
                users
                    .iter()
                    .map(|u| serde_json::Value::String(u.clone()))
                    .collect(),
            ),
        );
    }
    let mut patch = Attributes::new();
    patch.insert(
        REACTIONS_ATTRIBUTE.to_string(),
        serde_json::Value::Object(map),
    );
    patch
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub identity: String,
    #[serde(default)]
    pub last_read_message_index: Option<MessageIndex>,
}

/// Delivery state of a message authored by the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sending,
    Delivered,
    Read,
}

/// Derives the delivery status of `message` as seen by `own_username`.
///
/// Messages from other authors have no status.
pub fn delivery_status(
    message: &Message,
    participants: &[Participant],
    own_username: Option<&str>,
) -> Option<DeliveryStatus> {
    if message.is_sending() {
        return Some(DeliveryStatus::Sending);
    }
    if own_username != Some(message.author.as_str()) {
        return None;
    }
    let read = participants.iter().any(|p| {
        p.identity != message.author
            && p.last_read_message_index
                .is_some_and(|idx| !idx.is_pending() && idx.0 >= message.index.0)
    });
    Some(if read {
        DeliveryStatus::Read
    } else {
        DeliveryStatus::Delivered
    })
}
