//! The logged-in user and the conversation they have open.
//!
//! [`Session`] holds no chat data of its own; every operation takes the
//! [`Store`] explicitly and applies the session's permission rules before
//! mutating it.

use chrono::Utc;
use tracing::{info, warn};

use teamchat_shared::constants::{FILE_MESSAGE_PREFIX, MAX_FILE_SIZE};
use teamchat_shared::{ContactRef, GroupId, MessageId, MessageKind, Presence, UserId};
use teamchat_store::{Group, Message, NewGroup, NewMessage, NewUser, Store, User};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_user: Option<UserId>,
    conversation: Option<ContactRef>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.current_user
    }

    pub fn current_user<'s>(&self, store: &'s Store) -> Option<&'s User> {
        self.current_user.and_then(|id| store.user(id))
    }

    pub fn conversation(&self) -> Option<ContactRef> {
        self.conversation
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn require_user(&self) -> Result<UserId> {
        self.current_user.ok_or(ClientError::NotLoggedIn)
    }

    pub fn require_conversation(&self) -> Result<ContactRef> {
        self.conversation.ok_or(ClientError::NoConversation)
    }

    fn require_admin<'s>(&self, store: &'s Store, action: &str) -> Result<&'s User> {
        let user = self.current_user(store).ok_or(ClientError::NotLoggedIn)?;
        if !user.is_admin() {
            return Err(ClientError::PermissionDenied(format!(
                "only admins can {action}"
            )));
        }
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Login / logout
    // ------------------------------------------------------------------

    /// Log in with a phone number.  Whoever was logged in before is logged
    /// out first.
    pub fn login(&mut self, store: &mut Store, phone: &str) -> Result<UserId> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(ClientError::Validation("phone number is required".into()));
        }
        let id = store
            .user_by_phone(phone)
            .map(|u| u.id)
            .ok_or_else(|| ClientError::NotFound(format!("phone number {phone}")))?;

        if self.current_user.is_some() {
            self.logout(store);
        }

        store.set_presence(id, Presence::Online, Utc::now())?;
        self.current_user = Some(id);
        self.conversation = None;

        info!(user = %id, "login successful");
        Ok(id)
    }

    /// Mark the current user offline and clear the session.  Returns who was
    /// logged out, if anyone.
    pub fn logout(&mut self, store: &mut Store) -> Option<UserId> {
        let id = self.current_user.take()?;
        self.conversation = None;

        // The user may have been removed while logged in.
        if store.user(id).is_some() {
            if let Err(e) = store.set_presence(id, Presence::Offline, Utc::now()) {
                warn!(user = %id, error = %e, "failed to mark user offline");
            }
        }

        info!(user = %id, "logged out");
        Some(id)
    }

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    /// Open a conversation with another user or with a group the current
    /// user belongs to.
    pub fn open_conversation(&mut self, store: &Store, contact: ContactRef) -> Result<()> {
        let me = self.require_user()?;
        match contact {
            ContactRef::User(id) => {
                if store.user(id).is_none() {
                    return Err(ClientError::NotFound(format!("user {id}")));
                }
                if id == me {
                    return Err(ClientError::Validation(
                        "cannot open a conversation with yourself".into(),
                    ));
                }
            }
            ContactRef::Group(id) => {
                let group = store
                    .group(id)
                    .ok_or_else(|| ClientError::NotFound(format!("group {id}")))?;
                if !group.has_member(me) {
                    return Err(ClientError::PermissionDenied(format!(
                        "not a member of group {id}"
                    )));
                }
            }
        }

        self.conversation = Some(contact);
        Ok(())
    }

    pub fn close_conversation(&mut self) {
        self.conversation = None;
    }

    // ------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------

    /// Send a text message to the open conversation.
    pub fn send_text(&self, store: &mut Store, content: &str) -> Result<MessageId> {
        self.send(store, content, MessageKind::Text)
    }

    /// Send a file message to the open conversation.  Only the file name is
    /// recorded; files above the size limit are rejected.
    pub fn send_file(&self, store: &mut Store, file_name: &str, size: u64) -> Result<MessageId> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ClientError::Validation("file name is required".into()));
        }
        if size > MAX_FILE_SIZE {
            return Err(ClientError::Validation(format!(
                "file size must be at most {MAX_FILE_SIZE} bytes"
            )));
        }
        let content = format!("{FILE_MESSAGE_PREFIX} {file_name}");
        self.send(store, &content, MessageKind::File)
    }

    fn send(&self, store: &mut Store, content: &str, kind: MessageKind) -> Result<MessageId> {
        let me = self.require_user()?;
        let contact = self.require_conversation()?;

        let id = store.add_message(NewMessage {
            sender: me,
            destination: contact.into(),
            content: content.to_string(),
            kind,
            timestamp: Utc::now(),
        })?;
        Ok(id)
    }

    /// Delete a message.  Senders may delete their own messages; admins may
    /// delete any message.
    pub fn delete_message(&self, store: &mut Store, id: MessageId) -> Result<Message> {
        let me = self.current_user(store).ok_or(ClientError::NotLoggedIn)?;
        let message = store
            .message(id)
            .ok_or_else(|| ClientError::NotFound(format!("message {id}")))?;

        if message.sender_id != me.id && !me.is_admin() {
            return Err(ClientError::PermissionDenied(
                "only the sender or an admin can delete a message".into(),
            ));
        }

        Ok(store.remove_message(id)?)
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Create a group owned by the current user.
    pub fn create_group(
        &self,
        store: &mut Store,
        name: &str,
        members: Vec<UserId>,
        description: &str,
    ) -> Result<GroupId> {
        let me = self.require_user()?;
        let id = store.add_group(NewGroup {
            name: name.to_string(),
            creator: me,
            members,
            description: description.to_string(),
            avatar: None,
        })?;
        Ok(id)
    }

    /// Delete a group.  Allowed for admins and for the group's own admin.
    pub fn remove_group(&mut self, store: &mut Store, id: GroupId) -> Result<Group> {
        let me = self.current_user(store).ok_or(ClientError::NotLoggedIn)?;
        let group = store
            .group(id)
            .ok_or_else(|| ClientError::NotFound(format!("group {id}")))?;
        if !me.is_admin() && group.admin != me.id {
            return Err(ClientError::PermissionDenied(
                "only admins can delete this group".into(),
            ));
        }

        let removed = store.remove_group(id)?;
        self.forget_missing_contact(store);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn add_user(&self, store: &mut Store, new: NewUser) -> Result<UserId> {
        self.require_admin(store, "add users")?;
        Ok(store.add_user(new)?)
    }

    /// Remove another user (admins only).  Admins cannot remove themselves.
    pub fn remove_user(&mut self, store: &mut Store, id: UserId) -> Result<User> {
        let me = self.require_admin(store, "remove users")?.id;
        if id == me {
            return Err(ClientError::Validation("cannot remove yourself".into()));
        }

        let removed = store.remove_user(id)?;
        self.forget_missing_contact(store);
        Ok(removed)
    }

    pub fn save_settings(
        &self,
        store: &mut Store,
        company_name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        self.require_admin(store, "change company settings")?;
        store.update_company(company_name, description);
        Ok(())
    }

    pub fn set_logo(&self, store: &mut Store, data_url: &str) -> Result<()> {
        self.require_admin(store, "change the company logo")?;
        Ok(store.set_logo(data_url)?)
    }

    /// Close the open conversation if its contact no longer exists or the
    /// current user is no longer in the group.
    fn forget_missing_contact(&mut self, store: &Store) {
        let Some(contact) = self.conversation else {
            return;
        };
        let still_there = match contact {
            ContactRef::User(id) => store.user(id).is_some(),
            ContactRef::Group(id) => store
                .group(id)
                .zip(self.current_user)
                .is_some_and(|(g, me)| g.has_member(me)),
        };
        if !still_there {
            self.conversation = None;
        }
    }
}
