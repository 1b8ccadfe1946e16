//! The [`Store`]: chat state plus the backend it is mirrored to.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use teamchat_shared::constants::{
    DEFAULT_NAMESPACE, GROUPS_KEY, MESSAGES_KEY, SETTINGS_KEY, USERS_KEY,
};
use teamchat_shared::{GroupId, MessageId, UserId};

use crate::error::Result;
use crate::models::{CompanySettings, Group, Message, User};
use crate::seed;
use crate::storage::{KvStorage, MemoryStorage};

/// Owner of all chat state.
///
/// Collections keep insertion order; that order is what the contact list
/// shows and what breaks timestamp ties in threads.
pub struct Store {
    storage: Box<dyn KvStorage>,
    namespace: String,
    pub(crate) users: Vec<User>,
    pub(crate) groups: Vec<Group>,
    pub(crate) messages: Vec<Message>,
    pub(crate) company: CompanySettings,
}

/// Settings as they appear on disk.  Every field is optional so partially
/// written or older documents still load.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSettings {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl Store {
    /// Load every record from `storage`, seeding defaults for any record
    /// that is missing or unreadable.  Never fails.
    pub fn load(storage: impl KvStorage + 'static, namespace: &str) -> Self {
        let now = Utc::now();
        let key = |record: &str| format!("{namespace}_{record}");

        let users = load_record(&storage, &key(USERS_KEY), || seed::default_users(now));
        let messages = load_record(&storage, &key(MESSAGES_KEY), || {
            seed::default_messages(now)
        });
        let groups = load_record(&storage, &key(GROUPS_KEY), seed::default_groups);

        let mut company = seed::default_company();
        let saved: Option<PersistedSettings> =
            load_record(&storage, &key(SETTINGS_KEY), || None);
        if let Some(saved) = saved {
            if let Some(name) = saved.name.filter(|n| !n.trim().is_empty()) {
                company.name = name;
            }
            if let Some(logo) = saved.logo.filter(|l| !l.is_empty()) {
                company.logo = Some(logo);
            }
            if let Some(description) = saved.description {
                company.description = description;
            }
        }

        info!(
            namespace,
            users = users.len(),
            groups = groups.len(),
            messages = messages.len(),
            "store loaded"
        );

        Self {
            storage: Box::new(storage),
            namespace: namespace.to_string(),
            users,
            groups,
            messages,
            company,
        }
    }

    /// A store with no users, groups or messages and default company
    /// settings.  Nothing is read from `storage`.
    pub fn empty(storage: impl KvStorage + 'static, namespace: &str) -> Self {
        Self {
            storage: Box::new(storage),
            namespace: namespace.to_string(),
            users: Vec::new(),
            groups: Vec::new(),
            messages: Vec::new(),
            company: seed::default_company(),
        }
    }

    /// Seeded store backed by volatile memory.
    pub fn in_memory() -> Self {
        Self::load(MemoryStorage::new(), DEFAULT_NAMESPACE)
    }

    /// Persist the full state.  Failures are logged and swallowed; the
    /// in-memory state stays authoritative.
    pub fn save(&mut self) {
        if let Err(e) = self.try_save() {
            warn!(namespace = %self.namespace, error = %e, "error saving data");
        }
    }

    /// Persist the full state, reporting the first failure.  Every record is
    /// attempted even if an earlier one fails.
    pub fn try_save(&mut self) -> Result<()> {
        let settings = PersistedSettings {
            name: Some(self.company.name.clone()),
            logo: self.company.logo.clone(),
            description: Some(self.company.description.clone()),
        };

        let documents = [
            (USERS_KEY, serde_json::to_string(&self.users)),
            (MESSAGES_KEY, serde_json::to_string(&self.messages)),
            (GROUPS_KEY, serde_json::to_string(&self.groups)),
            (SETTINGS_KEY, serde_json::to_string(&settings)),
        ];

        let mut first_error = None;
        for (record, json) in documents {
            let key = self.key(record);
            let written = json
                .map_err(Into::into)
                .and_then(|json| self.storage.set(&key, &json));
            if let Err(e) = written {
                warn!(key = %key, error = %e, "failed to persist record");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                debug!(namespace = %self.namespace, "state saved");
                Ok(())
            }
        }
    }

    /// Wipe the persisted namespace and start over from the demo data.
    pub fn reset(&mut self) {
        let prefix = format!("{}_", self.namespace);
        match self.storage.clear_prefix(&prefix) {
            Ok(removed) => info!(namespace = %self.namespace, removed, "cleared stored data"),
            Err(e) => warn!(namespace = %self.namespace, error = %e, "error clearing storage"),
        }

        let now = Utc::now();
        self.users = seed::default_users(now);
        self.groups = seed::default_groups();
        self.messages = seed::default_messages(now);
        self.company = seed::default_company();
        self.save();
    }

    /// Give back the backend, e.g. to reload it into a fresh store.
    pub fn into_storage(self) -> Box<dyn KvStorage> {
        self.storage
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, record: &str) -> String {
        format!("{}_{}", self.namespace, record)
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn company(&self) -> &CompanySettings {
        &self.company
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_phone(&self, phone: &str) -> Option<&User> {
        self.users.iter().find(|u| u.phone == phone)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub(crate) fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    // ------------------------------------------------------------------
    // Identifier allocation
    // ------------------------------------------------------------------

    pub(crate) fn next_user_id(&self) -> UserId {
        self.users
            .iter()
            .map(|u| u.id)
            .max()
            .map_or(UserId(1), UserId::next)
    }

    pub(crate) fn next_group_id(&self) -> GroupId {
        self.groups
            .iter()
            .map(|g| g.id)
            .max()
            .map_or(GroupId(1), GroupId::next)
    }

    pub(crate) fn next_message_id(&self) -> MessageId {
        self.messages
            .iter()
            .map(|m| m.id)
            .max()
            .map_or(MessageId(1), MessageId::next)
    }
}

/// Read and decode one record, falling back to `default` when the key is
/// absent or the backend / JSON fails.
fn load_record<T, F>(storage: &dyn KvStorage, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match storage.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored record is corrupt, using defaults");
                default()
            }
        },
        Ok(None) => default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read stored record, using defaults");
            default()
        }
    }
}
