/// Application name
pub const APP_NAME: &str = "TechCorp Chat";

/// Default storage namespace; every persisted key is prefixed with it.
pub const DEFAULT_NAMESPACE: &str = "chatApp";

/// Storage key suffixes for the four persisted records
pub const USERS_KEY: &str = "users";
pub const MESSAGES_KEY: &str = "messages";
pub const GROUPS_KEY: &str = "groups";
pub const SETTINGS_KEY: &str = "settings";

/// Default company settings
pub const DEFAULT_COMPANY_NAME: &str = "TechCorp Inc.";
pub const DEFAULT_COMPANY_DESCRIPTION: &str = "Always-Available Enterprise Chat";

/// Avatar glyphs used when none is supplied
pub const DEFAULT_USER_AVATAR: &str = "👤";
pub const DEFAULT_GROUP_AVATAR: &str = "👥";

/// Maximum attachment size in bytes (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Number of characters kept in a contact's last-message preview
pub const PREVIEW_CHARS: usize = 30;

/// Prefix prepended to file message content
pub const FILE_MESSAGE_PREFIX: &str = "📎";
