use tracing::debug;

use teamchat_shared::MessageId;

use crate::error::{Result, StoreError};
use crate::models::{Destination, Message, NewMessage};
use crate::store::Store;

impl Store {
    /// Append a message.  The sender and destination must exist and the
    /// content must not be blank.
    pub fn add_message(&mut self, new: NewMessage) -> Result<MessageId> {
        let content = new.content.trim();
        if content.is_empty() {
            return Err(StoreError::Validation("message content is empty".into()));
        }
        if self.user(new.sender).is_none() {
            return Err(StoreError::not_found("user", new.sender));
        }
        match new.destination {
            Destination::User(id) if self.user(id).is_none() => {
                return Err(StoreError::not_found("user", id));
            }
            Destination::Group(id) if self.group(id).is_none() => {
                return Err(StoreError::not_found("group", id));
            }
            _ => {}
        }

        let message = Message {
            id: self.next_message_id(),
            sender_id: new.sender,
            destination: new.destination,
            content: content.to_string(),
            timestamp: new.timestamp,
            kind: new.kind,
        };
        let id = message.id;

        debug!(msg_id = %id, sender = %message.sender_id, destination = ?message.destination, "message stored");
        self.messages.push(message);
        self.save();
        Ok(id)
    }

    pub fn remove_message(&mut self, id: MessageId) -> Result<Message> {
        let index = self
            .messages
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("message", id))?;
        let message = self.messages.remove(index);

        debug!(msg_id = %id, "message removed");
        self.save();
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use teamchat_shared::{GroupId, UserId};

    use super::*;

    #[test]
    fn add_message_appends_with_next_id() {
        let mut store = Store::in_memory();
        let id = store
            .add_message(NewMessage::text(
                UserId(1),
                Destination::User(UserId(5)),
                "  ping  ",
            ))
            .unwrap();

        assert_eq!(id, MessageId(6));
        let last = store.messages().last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.content, "ping");
    }

    #[test]
    fn blank_content_is_rejected() {
        let mut store = Store::in_memory();
        let err = store
            .add_message(NewMessage::text(UserId(1), Destination::User(UserId(2)), " \n "))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.messages().len(), 5);
    }

    #[test]
    fn unknown_destination_is_not_found() {
        let mut store = Store::in_memory();
        assert!(matches!(
            store.add_message(NewMessage::text(
                UserId(1),
                Destination::Group(GroupId(9)),
                "hi"
            )),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.add_message(NewMessage::text(
                UserId(9),
                Destination::User(UserId(1)),
                "hi"
            )),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn remove_message_by_id() {
        let mut store = Store::in_memory();
        let removed = store.remove_message(MessageId(3)).unwrap();
        assert_eq!(removed.sender_id, UserId(3));
        assert!(store.message(MessageId(3)).is_none());
        assert!(matches!(
            store.remove_message(MessageId(3)),
            Err(StoreError::NotFound(_))
        ));
    }
}
