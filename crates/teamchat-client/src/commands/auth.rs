use teamchat_shared::UserId;
use teamchat_store::User;

use crate::error::Result;
use crate::events::{Change, ChatEvent};
use crate::state::AppState;

impl AppState {
    /// Log in by phone number, replacing any previous session.
    pub fn login(&mut self, phone: &str) -> Result<UserId> {
        let previous = self.session.current_user_id();
        let id = self.session.login(&mut self.store, phone)?;

        if let Some(user) = previous {
            self.events.emit(ChatEvent::LoggedOut { user });
        }
        self.events.emit(ChatEvent::LoggedIn { user: id });
        self.events.changed(Change::Presence);
        Ok(id)
    }

    pub fn logout(&mut self) -> Option<UserId> {
        let user = self.session.logout(&mut self.store)?;
        self.events.emit(ChatEvent::LoggedOut { user });
        self.events.changed(Change::Presence);
        Some(user)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.current_user(&self.store)
    }
}
