//! # teamchat-store
//!
//! In-memory chat state (users, groups, messages, company settings) mirrored
//! to a key-value backend after every mutation.
//!
//! The [`Store`] owns the four collections and a boxed [`KvStorage`].  Each
//! record is serialized to JSON under its own key, so one corrupt record
//! never prevents the others from loading.  Persistence failures are logged
//! and absorbed; they never surface to callers of the mutation helpers.

pub mod database;
pub mod groups;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod seed;
pub mod settings;
pub mod storage;
pub mod store;
pub mod users;

mod error;

pub use database::SqliteStorage;
pub use error::{Result, StoreError};
pub use models::*;
pub use storage::{KvStorage, MemoryStorage};
pub use store::Store;
