use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;
use uuid::Uuid;

/// What kind of conversation a chat is. Group-only fields live on the group
/// variant, so a direct chat cannot carry an admin or a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatKind {
    Direct,
    Group { admin: Uuid, name: String, picture: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Chat {
    pub id: Uuid,
    pub kind: ChatKind,
    /// Each member mapped to their "messages deleted at" marker. A member's
    /// marker starts at their membership row's creation time, which reads as
    /// "nothing cleared yet". Membership and markers move together, so every
    /// member has exactly one marker.
    pub members: BTreeMap<Uuid, OffsetDateTime>,
    /// Timestamp of the most recent message, maintained by the messaging
    /// subsystem. `None` means no message was ever sent in this chat.
    pub last_message_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields for a chat that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewChat {
    pub kind: ChatKind,
    pub members: BTreeSet<Uuid>,
}

impl Chat {
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group { .. })
    }

    #[must_use]
    pub fn group_admin(&self) -> Option<Uuid> {
        match &self.kind {
            ChatKind::Group { admin, .. } => Some(*admin),
            ChatKind::Direct => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ChatKind::Group { name, .. } => Some(name),
            ChatKind::Direct => None,
        }
    }

    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        match &self.kind {
            ChatKind::Group { picture, .. } => picture.as_deref(),
            ChatKind::Direct => None,
        }
    }

    #[must_use]
    pub fn is_group_admin(&self, user_id: Uuid) -> bool {
        self.group_admin() == Some(user_id)
    }

    #[must_use]
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains_key(&user_id)
    }

    /// The viewer's "messages deleted at" marker, if they are a member.
    #[must_use]
    pub fn cleared_at(&self, user_id: Uuid) -> Option<OffsetDateTime> {
        self.members.get(&user_id).copied()
    }

    #[must_use]
    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.keys().copied().collect()
    }
}

/// Canonical key identifying a direct chat by its unordered member pair.
/// The same two members always produce the same key regardless of the order
/// they were supplied in, which is what the store's uniqueness constraint
/// hangs off.
#[must_use]
pub fn direct_key(members: &BTreeSet<Uuid>) -> String {
    let ids: Vec<String> = members.iter().map(Uuid::to_string).collect();
    ids.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_chat(admin: Uuid, members: &[Uuid]) -> Chat {
        let now = OffsetDateTime::now_utc();
        Chat {
            id: Uuid::new_v4(),
            kind: ChatKind::Group { admin, name: "Trip".to_string(), picture: None },
            members: members.iter().map(|&m| (m, now)).collect(),
            last_message_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_group_admin_predicates() {
        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let chat = group_chat(admin, &[admin, member]);

        assert!(chat.is_group());
        assert!(chat.is_group_admin(admin));
        assert!(!chat.is_group_admin(member));
        assert!(chat.is_member(member));
        assert!(!chat.is_member(outsider));
    }

    #[test]
    fn test_direct_chat_has_no_group_fields() {
        let now = OffsetDateTime::now_utc();
        let chat = Chat {
            id: Uuid::new_v4(),
            kind: ChatKind::Direct,
            members: BTreeMap::new(),
            last_message_at: None,
            created_at: now,
            updated_at: now,
        };

        assert!(!chat.is_group());
        assert_eq!(chat.group_admin(), None);
        assert_eq!(chat.name(), None);
        assert_eq!(chat.picture(), None);
        assert!(!chat.is_group_admin(Uuid::new_v4()));
    }

    #[test]
    fn test_direct_key_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let forward: BTreeSet<Uuid> = [a, b].into_iter().collect();
        let reverse: BTreeSet<Uuid> = [b, a].into_iter().collect();

        assert_eq!(direct_key(&forward), direct_key(&reverse));
    }
}
