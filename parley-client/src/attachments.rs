use crate::model::Media;
use crate::sdk::Conversation;
use crate::state::{Blob, NotificationKind, SharedState};
use std::sync::Arc;
use tracing::{debug, warn};

/// Downloads the payload of `media`.
///
/// Failures are reported to the user through a notification and yield `None`;
/// callers add no handling of their own.
pub async fn fetch_blob<C: Conversation + ?Sized>(
    conversation: &C,
    media: &Media,
    state: &SharedState,
) -> Option<Blob> {
    debug!("Fetching media {} ({})", media.sid, media.filename);
    match conversation.fetch_media(media).await {
        Ok(data) => Some(Arc::new(data)),
        Err(e) => {
            warn!("Failed to fetch media {}: {}", media.sid, e);
            state.write().await.add_notification(
                NotificationKind::Error,
                format!("Failed to download {}.", media.filename),
            );
            None
        }
    }
}
