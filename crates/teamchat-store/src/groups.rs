//! CRUD operations for [`Group`] records.

use tracing::info;

use teamchat_shared::constants::DEFAULT_GROUP_AVATAR;
use teamchat_shared::{GroupId, UserId};

use crate::error::{Result, StoreError};
use crate::models::{Group, NewGroup};
use crate::store::Store;

impl Store {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Create a group administered by `new.creator`.
    ///
    /// Members are the creator followed by the selected users, without
    /// duplicates.  At least one member besides the creator is required.
    pub fn add_group(&mut self, new: NewGroup) -> Result<GroupId> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("group name is required".into()));
        }
        if self.user(new.creator).is_none() {
            return Err(StoreError::not_found("user", new.creator));
        }

        let mut members: Vec<UserId> = vec![new.creator];
        for id in new.members {
            if self.user(id).is_none() {
                return Err(StoreError::not_found("user", id));
            }
            if !members.contains(&id) {
                members.push(id);
            }
        }
        if members.len() < 2 {
            return Err(StoreError::Validation(
                "select at least one member".into(),
            ));
        }

        let avatar = new
            .avatar
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_GROUP_AVATAR);

        let group = Group {
            id: self.next_group_id(),
            name: name.to_string(),
            members,
            admin: new.creator,
            avatar: avatar.to_string(),
            description: new.description.trim().to_string(),
        };
        let id = group.id;

        info!(group = %id, name = %group.name, members = group.members.len(), "group created");
        self.groups.push(group);
        self.save();
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a group and every message posted to it.
    pub fn remove_group(&mut self, id: GroupId) -> Result<Group> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| StoreError::not_found("group", id))?;
        let group = self.groups.remove(index);

        let before = self.messages.len();
        self.messages.retain(|m| m.group_id() != Some(id));

        info!(
            group = %id,
            messages_removed = before - self.messages.len(),
            "group removed"
        );
        self.save();
        Ok(group)
    }

    /// Groups `user` belongs to, in insertion order.
    pub fn groups_of(&self, user: UserId) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(move |g| g.has_member(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_group(creator: u64, members: &[u64]) -> NewGroup {
        NewGroup {
            name: "Ops".into(),
            creator: UserId(creator),
            members: members.iter().copied().map(UserId).collect(),
            description: " on call ".into(),
            avatar: None,
        }
    }

    #[test]
    fn creator_becomes_admin_and_first_member() {
        let mut store = Store::in_memory();
        let id = store.add_group(new_group(2, &[5, 2, 5, 3])).unwrap();

        let group = store.group(id).unwrap();
        assert_eq!(id, GroupId(3));
        assert_eq!(group.admin, UserId(2));
        assert_eq!(group.members, vec![UserId(2), UserId(5), UserId(3)]);
        assert_eq!(group.description, "on call");
        assert_eq!(group.avatar, DEFAULT_GROUP_AVATAR);
    }

    #[test]
    fn group_without_selected_members_is_rejected() {
        let mut store = Store::in_memory();
        assert!(matches!(
            store.add_group(new_group(1, &[])),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.add_group(new_group(1, &[1])),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.groups().len(), 2);
    }

    #[test]
    fn unknown_member_is_not_found() {
        let mut store = Store::in_memory();
        assert!(matches!(
            store.add_group(new_group(1, &[99])),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.groups().len(), 2);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut store = Store::in_memory();
        let mut new = new_group(1, &[2]);
        new.name = "   ".into();
        assert!(matches!(store.add_group(new), Err(StoreError::Validation(_))));
    }

    #[test]
    fn remove_group_cascades_to_its_messages() {
        let mut store = Store::in_memory();
        let removed = store.remove_group(GroupId(1)).unwrap();

        assert_eq!(removed.name, "Development Team");
        assert!(store.group(GroupId(1)).is_none());
        assert!(store.messages().iter().all(|m| m.group_id().is_none()));
        assert_eq!(store.messages().len(), 3);
    }

    #[test]
    fn groups_of_filters_by_membership() {
        let store = Store::in_memory();
        let ids: Vec<_> = store.groups_of(UserId(2)).map(|g| g.id).collect();
        assert_eq!(ids, vec![GroupId(2)]);
    }
}
