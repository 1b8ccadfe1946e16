//! Derived, read-only views over the [`Store`] for one viewing user: the
//! contact list and ordered message threads.
//!
//! Nothing here mutates state.  The only side effect is
//! [`Projector::thread_view`] publishing [`ChatEvent::Mentioned`] when a
//! rendered message mentions the viewer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use teamchat_shared::constants::PREVIEW_CHARS;
use teamchat_shared::{ContactRef, MessageId, MessageKind, Presence, UserId};
use teamchat_store::{Message, Store};

use crate::events::{ChatEvent, EventBus};
use crate::mentions::{self, Mention};

/// One row of the contact list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub contact: ContactRef,
    pub name: String,
    pub avatar: String,
    /// Users only.
    pub phone: Option<String>,
    /// Users only.
    pub status: Option<Presence>,
    /// Groups only.
    pub member_count: Option<usize>,
    /// Latest message in the conversation, truncated for display.
    pub last_message: Option<String>,
    /// Always zero; read receipts are not tracked.
    pub unread: u32,
}

impl ContactEntry {
    /// Status line under the name: presence for users, member count for
    /// groups.
    pub fn subtitle(&self) -> String {
        match (self.status, self.member_count) {
            (Some(status), _) => status.to_string(),
            (None, Some(count)) => format!("{count} members"),
            (None, None) => String::new(),
        }
    }
}

/// One message as the viewer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub sender: UserId,
    /// Set for messages from others in group threads.
    pub sender_name: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Sent by the viewer.
    pub outgoing: bool,
    pub can_delete: bool,
    pub mentions: Vec<Mention>,
}

pub struct Projector<'a> {
    store: &'a Store,
}

impl<'a> Projector<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Every other user, then every group containing `current`, in store
    /// insertion order.
    pub fn contact_list(&self, current: UserId) -> Vec<ContactEntry> {
        let users = self
            .store
            .users()
            .iter()
            .filter(|u| u.id != current)
            .map(|u| {
                let contact = ContactRef::User(u.id);
                ContactEntry {
                    contact,
                    name: u.name.clone(),
                    avatar: u.avatar.clone(),
                    phone: Some(u.phone.clone()),
                    status: Some(u.status),
                    member_count: None,
                    last_message: self.last_message(current, contact),
                    unread: 0,
                }
            });

        let groups = self.store.groups_of(current).map(|g| {
            let contact = ContactRef::Group(g.id);
            ContactEntry {
                contact,
                name: g.name.clone(),
                avatar: g.avatar.clone(),
                phone: None,
                status: None,
                member_count: Some(g.members.len()),
                last_message: self.last_message(current, contact),
                unread: 0,
            }
        });

        users.chain(groups).collect()
    }

    /// Messages of one conversation, oldest first.  Messages with equal
    /// timestamps keep their insertion order.
    pub fn message_thread(&self, current: UserId, contact: ContactRef) -> Vec<&'a Message> {
        let mut thread: Vec<&Message> = self
            .store
            .messages()
            .iter()
            .filter(|m| belongs_to(m, current, contact))
            .collect();
        thread.sort_by_key(|m| m.timestamp);
        thread
    }

    /// The thread annotated for display.  Publishes a
    /// [`ChatEvent::Mentioned`] for each message from someone else that
    /// mentions the viewer.
    pub fn thread_view(
        &self,
        current: UserId,
        contact: ContactRef,
        events: &EventBus,
    ) -> Vec<MessageView> {
        let viewer_is_admin = self.store.user(current).is_some_and(|u| u.is_admin());
        let in_group = matches!(contact, ContactRef::Group(_));

        self.message_thread(current, contact)
            .into_iter()
            .map(|m| {
                let outgoing = m.sender_id == current;
                let mentions = mentions::find_mentions(&m.content, self.store.users());

                if !outgoing && mentions.iter().any(|x| x.user == Some(current)) {
                    events.emit(ChatEvent::Mentioned {
                        message: m.id,
                        by: m.sender_id,
                        content: m.content.clone(),
                    });
                }

                let sender_name = (in_group && !outgoing).then(|| {
                    self.store
                        .user(m.sender_id)
                        .map_or_else(|| "Unknown".to_string(), |u| u.name.clone())
                });

                MessageView {
                    id: m.id,
                    sender: m.sender_id,
                    sender_name,
                    content: m.content.clone(),
                    timestamp: m.timestamp,
                    kind: m.kind,
                    outgoing,
                    can_delete: outgoing || viewer_is_admin,
                    mentions,
                }
            })
            .collect()
    }

    /// Most recently stored message of a conversation (by insertion, not by
    /// timestamp), truncated for the contact list.
    fn last_message(&self, current: UserId, contact: ContactRef) -> Option<String> {
        self.store
            .messages()
            .iter()
            .rev()
            .find(|m| belongs_to(m, current, contact))
            .map(|m| preview(&m.content))
    }
}

/// Case-insensitive search over name and phone.
pub fn filter_contacts(entries: &[ContactEntry], term: &str) -> Vec<ContactEntry> {
    let term = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&term)
                || e.phone.as_deref().is_some_and(|p| p.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

fn belongs_to(message: &Message, current: UserId, contact: ContactRef) -> bool {
    match contact {
        ContactRef::User(other) => message.is_between(current, other),
        ContactRef::Group(group) => message.group_id() == Some(group),
    }
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use teamchat_shared::{GroupId, Role};
    use teamchat_store::{Destination, MemoryStorage, NewMessage, NewUser};

    use super::*;

    fn two_users() -> Store {
        let mut store = Store::empty(MemoryStorage::new(), "t");
        for (name, phone) in [("Alice", "+1"), ("Bob", "+2")] {
            store
                .add_user(NewUser {
                    name: name.into(),
                    phone: phone.into(),
                    role: Role::User,
                    avatar: None,
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn hello_is_visible_from_both_sides() {
        let mut store = two_users();
        store
            .add_message(NewMessage::text(UserId(1), Destination::User(UserId(2)), "hello"))
            .unwrap();

        let projector = Projector::new(&store);
        let from_a = projector.message_thread(UserId(1), ContactRef::User(UserId(2)));
        let from_b = projector.message_thread(UserId(2), ContactRef::User(UserId(1)));

        assert_eq!(from_a.len(), 1);
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_a[0].content, "hello");
        assert_eq!(from_b[0].content, "hello");
    }

    #[test]
    fn thread_sorted_by_timestamp_with_stable_ties() {
        let mut store = two_users();
        let base = Utc::now();
        let offsets = [5, 1, 3, 1, 0, 3];
        for (i, minutes) in offsets.iter().enumerate() {
            let (from, to) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
            store
                .add_message(
                    NewMessage::text(UserId(from), Destination::User(UserId(to)), format!("m{i}"))
                        .at(base + Duration::minutes(*minutes)),
                )
                .unwrap();
        }

        let thread = Projector::new(&store).message_thread(UserId(1), ContactRef::User(UserId(2)));
        assert!(thread.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        let order: Vec<_> = thread.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(order, vec!["m4", "m1", "m3", "m2", "m5", "m0"]);
    }

    #[test]
    fn group_thread_contains_only_group_messages() {
        let store = Store::in_memory();
        let thread =
            Projector::new(&store).message_thread(UserId(1), ContactRef::Group(GroupId(1)));
        let ids: Vec<_> = thread.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MessageId(4), MessageId(5)]);
    }

    #[test]
    fn contact_list_uses_insertion_order() {
        let mut store = Store::in_memory();
        // Newest activity is with Tom, but he stays where he was inserted.
        store
            .add_message(NewMessage::text(UserId(5), Destination::User(UserId(1)), "late news"))
            .unwrap();

        let contacts = Projector::new(&store).contact_list(UserId(1));
        let order: Vec<_> = contacts.iter().map(|c| c.contact).collect();
        assert_eq!(
            order,
            vec![
                ContactRef::User(UserId(2)),
                ContactRef::User(UserId(3)),
                ContactRef::User(UserId(4)),
                ContactRef::User(UserId(5)),
                ContactRef::Group(GroupId(1)),
                ContactRef::Group(GroupId(2)),
            ]
        );
        assert_eq!(contacts[3].last_message.as_deref(), Some("late news"));
        assert_eq!(contacts[4].subtitle(), "3 members");
        assert_eq!(contacts[2].subtitle(), "online");
        assert!(contacts.iter().all(|c| c.unread == 0));
    }

    #[test]
    fn contact_list_excludes_foreign_groups() {
        let store = Store::in_memory();
        let contacts = Projector::new(&store).contact_list(UserId(5));
        assert!(contacts
            .iter()
            .all(|c| !matches!(c.contact, ContactRef::Group(_))));
        assert_eq!(contacts.len(), 4);
        assert_eq!(contacts[0].last_message, None);
    }

    #[test]
    fn last_message_is_truncated_to_thirty_chars() {
        let store = Store::in_memory();
        let contacts = Projector::new(&store).contact_list(UserId(1));
        let sarah = &contacts[0];
        assert_eq!(
            sarah.last_message.as_deref(),
            Some("Absolutely Sarah! The new feat...")
        );
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"é".repeat(31)), format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn filter_matches_name_or_phone() {
        let store = Store::in_memory();
        let contacts = Projector::new(&store).contact_list(UserId(1));

        let by_name = filter_contacts(&contacts, "LISA");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].contact, ContactRef::User(UserId(4)));

        let by_phone = filter_contacts(&contacts, "567894");
        assert_eq!(by_phone[0].contact, ContactRef::User(UserId(5)));

        assert_eq!(filter_contacts(&contacts, "").len(), contacts.len());
    }

    #[test]
    fn mention_of_viewer_emits_event() {
        let store = Store::in_memory();
        let events = EventBus::default();
        let mut rx = events.subscribe();

        let view = Projector::new(&store).thread_view(
            UserId(1),
            ContactRef::User(UserId(3)),
            &events,
        );

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].mentions[0].user, Some(UserId(1)));
        assert!(!view[0].outgoing);
        assert!(view[0].can_delete);
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::Mentioned {
                message: MessageId(3),
                by: UserId(3),
                content: "Latest build is ready for testing @John Admin".into(),
            }
        );
    }

    #[test]
    fn mention_of_someone_else_is_silent() {
        let store = Store::in_memory();
        let events = EventBus::default();
        let mut rx = events.subscribe();

        let view =
            Projector::new(&store).thread_view(UserId(3), ContactRef::User(UserId(1)), &events);

        assert!(view[0].outgoing);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn group_view_names_other_senders() {
        let mut store = Store::in_memory();
        store.remove_user(UserId(4)).unwrap();
        store
            .add_message(NewMessage::text(UserId(3), Destination::Group(GroupId(1)), "hey"))
            .unwrap();

        let view = Projector::new(&store).thread_view(
            UserId(1),
            ContactRef::Group(GroupId(1)),
            &EventBus::default(),
        );

        assert_eq!(view[0].sender_name, None);
        assert_eq!(view[1].sender_name.as_deref(), Some("Mike Developer"));
    }
}
