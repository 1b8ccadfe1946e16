use tracing::{info, warn};

use teamchat_shared::{GroupId, UserId};
use teamchat_store::{CompanySettings, NewUser};

use crate::error::{ClientError, Result};
use crate::events::{Change, ChatEvent};
use crate::state::AppState;

impl AppState {
    pub fn company(&self) -> &CompanySettings {
        self.store.company()
    }

    pub fn add_user(&mut self, new: NewUser) -> Result<UserId> {
        let id = self.session.add_user(&mut self.store, new)?;
        info!(user = %id, "User added");
        self.events.changed(Change::Users);
        Ok(id)
    }

    pub fn remove_user(&mut self, id: UserId) -> Result<()> {
        let removed = self.session.remove_user(&mut self.store, id)?;
        info!(user = %id, name = %removed.name, "User removed");
        self.events.changed(Change::Users);
        Ok(())
    }

    /// Create a group with the current user as its admin.
    pub fn create_group(
        &mut self,
        name: &str,
        members: Vec<UserId>,
        description: &str,
    ) -> Result<GroupId> {
        let id = self
            .session
            .create_group(&mut self.store, name, members, description)?;
        info!(group = %id, "Group created");
        self.events.changed(Change::Groups);
        Ok(id)
    }

    pub fn remove_group(&mut self, id: GroupId) -> Result<()> {
        let removed = self.session.remove_group(&mut self.store, id)?;
        info!(group = %id, name = %removed.name, "Group deleted");
        self.events.changed(Change::Groups);
        Ok(())
    }

    pub fn save_settings(&mut self, company_name: &str, description: Option<&str>) -> Result<()> {
        self.session
            .save_settings(&mut self.store, company_name, description)?;
        self.events.changed(Change::Settings);
        Ok(())
    }

    pub fn set_logo(&mut self, data_url: &str) -> Result<()> {
        self.session.set_logo(&mut self.store, data_url)?;
        self.events.changed(Change::Settings);
        Ok(())
    }

    /// Wipe everything persisted and start over from the demo data.  The
    /// current user is logged out.
    pub fn reset_all_data(&mut self) -> Result<()> {
        let me = self
            .session
            .current_user(&self.store)
            .ok_or(ClientError::NotLoggedIn)?;
        if !me.is_admin() {
            return Err(ClientError::PermissionDenied(
                "only admins can clear all data".into(),
            ));
        }

        warn!(namespace = %self.store.namespace(), "Clearing all data");
        if let Some(user) = self.session.logout(&mut self.store) {
            self.events.emit(ChatEvent::LoggedOut { user });
        }
        self.store.reset();
        self.events.changed(Change::Reset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use teamchat_shared::{ContactRef, ErrorKind, Role};
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

    fn new_user(name: &str, phone: &str) -> NewUser {
        NewUser {
            name: name.into(),
            phone: phone.into(),
            role: Role::User,
            avatar: None,
        }
    }

    #[test]
    fn admin_manages_users() {
        let mut state = logged_in("+1234567890");
        let mut rx = state.events.subscribe();

        let id = state.add_user(new_user("Nina Sales", "+1234567895")).unwrap();
        assert_eq!(id, UserId(6));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::StateChanged {
                change: Change::Users
            }
        );

        state.remove_user(id).unwrap();
        assert!(state.store.user(id).is_none());
    }

    #[test]
    fn non_admin_is_denied() {
        let mut state = logged_in("+1234567892");

        let err = state.add_user(new_user("X", "+9")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        let err = state.save_settings("Evil Corp", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        let err = state.reset_all_data().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(state.company().name, "TechCorp Inc.");
    }

    #[test]
    fn group_lifecycle_for_regular_user() {
        let mut state = logged_in("+1234567893");
        let id = state
            .create_group("Design Review", vec![UserId(2)], "weekly")
            .unwrap();
        state.open_conversation(ContactRef::Group(id)).unwrap();

        state.remove_group(id).unwrap();

        assert!(state.store.group(id).is_none());
        assert_eq!(state.session.conversation(), None);
    }

    #[test]
    fn settings_and_logo() {
        let mut state = logged_in("+1234567890");
        state
            .save_settings("Acme", Some("Rockets and more"))
            .unwrap();
        state.set_logo("data:image/png;base64,AAAA").unwrap();
        assert_eq!(state.company().name, "Acme");
        assert_eq!(state.company().description, "Rockets and more");
        assert!(state.company().logo.is_some());

        let err = state.set_logo("https://example.com/logo.png").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn reset_restores_demo_data_and_logs_out() {
        let mut state = logged_in("+1234567890");
        state.add_user(new_user("Nina Sales", "+1234567895")).unwrap();
        state.save_settings("Acme", None).unwrap();
        let mut rx = state.events.subscribe();

        state.reset_all_data().unwrap();

        assert_eq!(state.store.users().len(), 5);
        assert_eq!(state.company().name, "TechCorp Inc.");
        assert!(state.current_user().is_none());
        assert_eq!(rx.try_recv().unwrap(), ChatEvent::LoggedOut { user: UserId(1) });
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::StateChanged {
                change: Change::Reset
            }
        );
    }
}
