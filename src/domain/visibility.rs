use crate::domain::chat::Chat;
use time::OffsetDateTime;
use uuid::Uuid;

/// Outcome of classifying a chat for one viewer's chat list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Render as an active conversation; no message lookup needed.
    Active,
    /// Active only if a message exists strictly after the marker, otherwise
    /// the chat is cleared for this viewer.
    CheckAfter(OffsetDateTime),
}

/// Classifies a chat for a viewer. Groups are never auto-cleared, and a chat
/// that has never seen a message is always shown, so a freshly created
/// conversation cannot start out hidden. Anything else depends on whether a
/// message arrived after the viewer's own clear marker, which is why the same
/// chat can be active for one member and cleared for another.
#[must_use]
pub fn classify(chat: &Chat, viewer: Uuid) -> Classification {
    if chat.is_group() {
        return Classification::Active;
    }
    if chat.last_message_at.is_none() {
        return Classification::Active;
    }
    match chat.cleared_at(viewer) {
        Some(marker) => Classification::CheckAfter(marker),
        None => Classification::Active,
    }
}
