//! Domain model structs held by the [`Store`](crate::Store).
//!
//! Every struct derives `Serialize` and `Deserialize`; the field names match
//! the persisted JSON layout (camelCase, `type` for the message kind).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teamchat_shared::{ContactRef, GroupId, MessageId, MessageKind, Presence, Role, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A person who can log in with their phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique; doubles as the login key.
    pub phone: String,
    pub role: Role,
    pub status: Presence,
    /// Single glyph (usually an emoji) shown as the avatar.
    pub avatar: String,
    pub last_seen: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Input for [`Store::add_user`](crate::Store::add_user).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub role: Role,
    /// Falls back to the default avatar when `None` or blank.
    pub avatar: Option<String>,
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named conversation shared by several users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Ordered, duplicate-free member list.
    pub members: Vec<UserId>,
    /// Always one of `members`.
    pub admin: UserId,
    pub avatar: String,
    #[serde(default)]
    pub description: String,
}

impl Group {
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

/// Input for [`Store::add_group`](crate::Store::add_group).
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    /// Becomes the group admin and first member.
    pub creator: UserId,
    /// Members selected in addition to the creator; at least one is required.
    pub members: Vec<UserId>,
    pub description: String,
    pub avatar: Option<String>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Where a message was sent.  Serialized flattened as either `receiverId`
/// or `groupId`, so a message always has exactly one of the two.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Destination {
    #[serde(rename = "receiverId")]
    User(UserId),
    #[serde(rename = "groupId")]
    Group(GroupId),
}

impl From<ContactRef> for Destination {
    fn from(contact: ContactRef) -> Self {
        match contact {
            ContactRef::User(id) => Destination::User(id),
            ContactRef::Group(id) => Destination::Group(id),
        }
    }
}

/// A single chat message.  Immutable once stored; it can only be deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "StoredMessage")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(flatten)]
    pub destination: Destination,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

/// On-disk shape of a [`Message`].  Both destination keys are optional here
/// so a record carrying both or neither can be rejected instead of guessed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMessage {
    id: MessageId,
    sender_id: UserId,
    #[serde(default)]
    receiver_id: Option<UserId>,
    #[serde(default)]
    group_id: Option<GroupId>,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(rename = "type", default)]
    kind: MessageKind,
}

impl TryFrom<StoredMessage> for Message {
    type Error = String;

    fn try_from(raw: StoredMessage) -> Result<Self, Self::Error> {
        let destination = match (raw.receiver_id, raw.group_id) {
            (Some(user), None) => Destination::User(user),
            (None, Some(group)) => Destination::Group(group),
            (Some(_), Some(_)) => {
                return Err(format!("message {} has both receiverId and groupId", raw.id))
            }
            (None, None) => {
                return Err(format!("message {} has neither receiverId nor groupId", raw.id))
            }
        };

        Ok(Self {
            id: raw.id,
            sender_id: raw.sender_id,
            destination,
            content: raw.content,
            timestamp: raw.timestamp,
            kind: raw.kind,
        })
    }
}

impl Message {
    pub fn receiver_id(&self) -> Option<UserId> {
        match self.destination {
            Destination::User(id) => Some(id),
            Destination::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self.destination {
            Destination::Group(id) => Some(id),
            Destination::User(_) => None,
        }
    }

    /// Whether this is a direct message between `a` and `b`, in either
    /// direction.
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        match self.destination {
            Destination::User(receiver) => {
                (self.sender_id == a && receiver == b) || (self.sender_id == b && receiver == a)
            }
            Destination::Group(_) => false,
        }
    }

    /// Whether `user` sent or directly received this message.
    pub fn involves(&self, user: UserId) -> bool {
        self.sender_id == user || self.receiver_id() == Some(user)
    }
}

/// Input for [`Store::add_message`](crate::Store::add_message).
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: UserId,
    pub destination: Destination,
    pub content: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

impl NewMessage {
    pub fn text(sender: UserId, destination: Destination, content: impl Into<String>) -> Self {
        Self {
            sender,
            destination,
            content: content.into(),
            kind: MessageKind::Text,
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

// ---------------------------------------------------------------------------
// Company settings
// ---------------------------------------------------------------------------

/// Process-wide branding shown on the login and header screens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanySettings {
    pub name: String,
    /// Logo as a `data:image/...` URL.
    pub logo: Option<String>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(destination: Destination) -> Message {
        Message {
            id: MessageId(1),
            sender_id: UserId(2),
            destination,
            content: "hi".into(),
            timestamp: DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            kind: MessageKind::Text,
        }
    }

    #[test]
    fn direct_message_json_layout() {
        let json = serde_json::to_value(sample(Destination::User(UserId(1)))).unwrap();
        assert_eq!(json["senderId"], 2);
        assert_eq!(json["receiverId"], 1);
        assert!(json.get("groupId").is_none());
        assert_eq!(json["type"], "text");
    }

    #[test]
    fn group_message_parses_from_stored_json() {
        let raw = r#"{"id":4,"senderId":4,"groupId":1,"content":"assets",
                      "timestamp":"2024-01-01T10:00:00Z","type":"file"}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.destination, Destination::Group(GroupId(1)));
        assert_eq!(msg.kind, MessageKind::File);
        assert_eq!(msg.receiver_id(), None);
    }

    #[test]
    fn stored_message_needs_exactly_one_destination() {
        let both = r#"{"id":1,"senderId":1,"receiverId":2,"groupId":1,"content":"x",
                       "timestamp":"2024-01-01T10:00:00Z","type":"text"}"#;
        let err = serde_json::from_str::<Vec<Message>>(&format!("[{both}]")).unwrap_err();
        assert!(err.to_string().contains("both receiverId and groupId"));

        let neither = r#"{"id":1,"senderId":1,"content":"x","timestamp":"2024-01-01T10:00:00Z"}"#;
        assert!(serde_json::from_str::<Message>(neither).is_err());

        let null_group = r#"{"id":1,"senderId":1,"receiverId":2,"groupId":null,"content":"x",
                             "timestamp":"2024-01-01T10:00:00Z"}"#;
        let msg: Message = serde_json::from_str(null_group).unwrap();
        assert_eq!(msg.destination, Destination::User(UserId(2)));
    }

    #[test]
    fn message_json_survives_a_round_trip() {
        let msg = sample(Destination::Group(GroupId(3)));
        let back: Message = serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn is_between_checks_both_directions() {
        let msg = sample(Destination::User(UserId(1)));
        assert!(msg.is_between(UserId(1), UserId(2)));
        assert!(msg.is_between(UserId(2), UserId(1)));
        assert!(!msg.is_between(UserId(1), UserId(3)));
        assert!(!sample(Destination::Group(GroupId(1))).is_between(UserId(2), UserId(1)));
    }
}
