pub mod attachment_card;
pub mod card;
pub mod image_preview;
pub mod message_list;
pub mod notification_bar;

pub use attachment_card::{AttachmentCard, AttachmentState};
pub use card::Card;
pub use image_preview::ImagePreviewModal;
pub use message_list::{MessageList, MessageListState};
pub use notification_bar::NotificationBar;
