//! User CRUD and presence updates.

use chrono::{DateTime, Utc};
use tracing::info;

use teamchat_shared::constants::DEFAULT_USER_AVATAR;
use teamchat_shared::{Presence, UserId};

use crate::error::{Result, StoreError};
use crate::models::{NewUser, User};
use crate::store::Store;

impl Store {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Add a user.  Name and phone are required and the phone must not be
    /// taken; on failure the store is left untouched.
    pub fn add_user(&mut self, new: NewUser) -> Result<UserId> {
        let name = new.name.trim();
        let phone = new.phone.trim();

        if name.is_empty() || phone.is_empty() {
            return Err(StoreError::Validation(
                "name and phone number are required".into(),
            ));
        }
        if self.user_by_phone(phone).is_some() {
            return Err(StoreError::DuplicatePhone(phone.to_string()));
        }

        let avatar = new
            .avatar
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_USER_AVATAR);

        let user = User {
            id: self.next_user_id(),
            name: name.to_string(),
            phone: phone.to_string(),
            role: new.role,
            status: Presence::Offline,
            avatar: avatar.to_string(),
            last_seen: Utc::now(),
        };
        let id = user.id;

        info!(user = %id, name = %user.name, role = ?user.role, "user added");
        self.users.push(user);
        self.save();
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Set a user's presence and last-seen time.
    pub fn set_presence(&mut self, id: UserId, status: Presence, at: DateTime<Utc>) -> Result<()> {
        let user = self
            .user_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        user.status = status;
        user.last_seen = at;
        self.save();
        Ok(())
    }

    /// Apply several presence changes and save once.  Unknown users are
    /// skipped; returns the users that were updated.
    pub fn set_presences(
        &mut self,
        changes: impl IntoIterator<Item = (UserId, Presence)>,
        at: DateTime<Utc>,
    ) -> Vec<UserId> {
        let mut updated = Vec::new();
        for (id, status) in changes {
            if let Some(user) = self.user_mut(id) {
                user.status = status;
                user.last_seen = at;
                updated.push(id);
            }
        }
        if !updated.is_empty() {
            self.save();
        }
        updated
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Remove a user together with every message they sent or received and
    /// their group memberships.
    ///
    /// A group whose admin leaves is handed to its first remaining member; a
    /// group left without members is removed along with its messages.
    pub fn remove_user(&mut self, id: UserId) -> Result<User> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        let user = self.users.remove(index);

        let before = self.messages.len();
        self.messages.retain(|m| !m.involves(id));
        let messages_removed = before - self.messages.len();

        for group in &mut self.groups {
            group.members.retain(|member| *member != id);
            if group.admin == id {
                if let Some(&first) = group.members.first() {
                    info!(group = %group.id, admin = %first, "group admin reassigned");
                    group.admin = first;
                }
            }
        }

        let emptied: Vec<_> = self
            .groups
            .iter()
            .filter(|g| g.members.is_empty())
            .map(|g| g.id)
            .collect();
        self.groups.retain(|g| !g.members.is_empty());
        self.messages
            .retain(|m| m.group_id().map_or(true, |g| !emptied.contains(&g)));

        info!(
            user = %id,
            messages_removed,
            groups_removed = emptied.len(),
            "user removed"
        );
        self.save();
        Ok(user)
    }
}
