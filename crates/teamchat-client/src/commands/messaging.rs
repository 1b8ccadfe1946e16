use tracing::info;

use teamchat_shared::{ContactRef, MessageId};

use crate::error::{ClientError, Result};
use crate::events::{Change, ChatEvent};
use crate::projector::{filter_contacts, ContactEntry, MessageView, Projector};
use crate::state::AppState;

impl AppState {
    /// The logged-in user's contact list.
    pub fn contacts(&self) -> Result<Vec<ContactEntry>> {
        let me = self.session.require_user()?;
        Ok(Projector::new(&self.store).contact_list(me))
    }

    pub fn search_contacts(&self, term: &str) -> Result<Vec<ContactEntry>> {
        Ok(filter_contacts(&self.contacts()?, term))
    }

    /// Open a conversation and return its thread.
    pub fn open_conversation(&mut self, contact: ContactRef) -> Result<Vec<MessageView>> {
        self.session.open_conversation(&self.store, contact)?;
        self.events.emit(ChatEvent::ConversationOpened { contact });
        self.thread(contact)
    }

    pub fn close_conversation(&mut self) {
        if self.session.conversation().is_some() {
            self.session.close_conversation();
            self.events.changed(Change::Session);
        }
    }

    /// Render the thread with `contact` for the logged-in user.
    pub fn thread(&self, contact: ContactRef) -> Result<Vec<MessageView>> {
        let me = self.session.require_user()?;
        if let ContactRef::Group(id) = contact {
            let group = self
                .store
                .group(id)
                .ok_or_else(|| ClientError::NotFound(format!("group {id}")))?;
            if !group.has_member(me) {
                return Err(ClientError::PermissionDenied(format!(
                    "not a member of group {id}"
                )));
            }
        }
        Ok(Projector::new(&self.store).thread_view(me, contact, &self.events))
    }

    pub fn current_thread(&self) -> Result<Vec<MessageView>> {
        let contact = self.session.require_conversation()?;
        self.thread(contact)
    }

    /// Send a text message to the open conversation.
    pub fn send_message(&mut self, content: &str) -> Result<MessageId> {
        let id = self.session.send_text(&mut self.store, content)?;
        info!(msg_id = %id, "Message sent");
        self.events.changed(Change::Messages);
        Ok(id)
    }

    pub fn send_file(&mut self, file_name: &str, size: u64) -> Result<MessageId> {
        let id = self.session.send_file(&mut self.store, file_name, size)?;
        info!(msg_id = %id, size, "File shared");
        self.events.changed(Change::Messages);
        Ok(id)
    }

    pub fn delete_message(&mut self, id: MessageId) -> Result<()> {
        self.session.delete_message(&mut self.store, id)?;
        info!(msg_id = %id, "Message deleted");
        self.events.changed(Change::Messages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use teamchat_shared::constants::MAX_FILE_SIZE;
    use teamchat_shared::{ErrorKind, GroupId, MessageKind, UserId};
    use teamchat_store::Store;

    use super::*;
    use crate::config::SimulatorConfig;
    use crate::simulator::{ScriptedRandom, Simulator};

    fn logged_in(phone: &str) -> AppState {
        let mut state = AppState::new(
            Store::in_memory(),
            Simulator::new(SimulatorConfig::default(), ScriptedRandom::default()),
        );
        state.login(phone).unwrap();
        state
    }

    #[test]
    fn contacts_require_login() {
        let state = AppState::new(
            Store::in_memory(),
            Simulator::new(SimulatorConfig::default(), ScriptedRandom::default()),
        );
        assert_eq!(state.contacts().unwrap_err().kind(), ErrorKind::Permission);
    }

    #[test]
    fn search_narrows_contacts() {
        let state = logged_in("+1234567890");
        assert_eq!(state.contacts().unwrap().len(), 6);

        let found = state.search_contacts("team").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].contact, ContactRef::Group(GroupId(1)));
    }

    #[test]
    fn open_then_send_appears_in_thread() {
        let mut state = logged_in("+1234567890");
        let mut rx = state.events.subscribe();

        let before = state.open_conversation(ContactRef::User(UserId(2))).unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::ConversationOpened {
                contact: ContactRef::User(UserId(2))
            }
        );

        let id = state.send_message("  see you at ten  ").unwrap();
        let thread = state.current_thread().unwrap();
        let last = thread.last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.content, "see you at ten");
        assert!(last.outgoing);
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::StateChanged {
                change: Change::Messages
            }
        );
    }

    #[test]
    fn sending_without_conversation_fails() {
        let mut state = logged_in("+1234567890");
        let err = state.send_message("hi").unwrap_err();
        assert!(matches!(err, ClientError::NoConversation));
    }

    #[test]
    fn file_messages_record_name_and_enforce_limit() {
        let mut state = logged_in("+1234567890");
        state.open_conversation(ContactRef::Group(GroupId(1))).unwrap();

        let id = state.send_file("specs.pdf", 2048).unwrap();
        let msg = state.store.message(id).unwrap();
        assert_eq!(msg.content, "📎 specs.pdf");
        assert_eq!(msg.kind, MessageKind::File);

        let err = state.send_file("huge.iso", MAX_FILE_SIZE + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn foreign_group_thread_is_hidden() {
        let state = logged_in("+1234567891");
        let err = state.thread(ContactRef::Group(GroupId(1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[test]
    fn delete_own_message_only() {
        let mut state = logged_in("+1234567891");
        let err = state.delete_message(MessageId(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);

        state.delete_message(MessageId(1)).unwrap();
        assert!(state.store.message(MessageId(1)).is_none());
    }

    #[test]
    fn close_conversation_clears_current_thread() {
        let mut state = logged_in("+1234567890");
        state.open_conversation(ContactRef::User(UserId(3))).unwrap();
        state.close_conversation();
        assert!(matches!(
            state.current_thread().unwrap_err(),
            ClientError::NoConversation
        ));
    }
}
