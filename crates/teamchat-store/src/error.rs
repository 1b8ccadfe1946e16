use teamchat_shared::ErrorKind;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error from the persistent backend.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// No record with the given identifier.
    #[error("{0} not found")]
    NotFound(String),

    /// Missing required field or otherwise invalid input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Another user already uses this phone number.
    #[error("Phone number already exists: {0}")]
    DuplicatePhone(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Validation(_) | StoreError::DuplicatePhone(_) => ErrorKind::Validation,
            StoreError::Sqlite(_)
            | StoreError::NoDataDir
            | StoreError::Io(_)
            | StoreError::Json(_)
            | StoreError::Migration(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound(format!("{what} {id}"))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
