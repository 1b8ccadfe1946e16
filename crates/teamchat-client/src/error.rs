use teamchat_shared::ErrorKind;
use teamchat_store::StoreError;
use thiserror::Error;

/// Errors returned by session and application entry points.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No user is logged in")]
    NotLoggedIn,

    #[error("No conversation is open")]
    NoConversation,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Store(e) => e.kind(),
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Validation(_) | ClientError::NoConversation => ErrorKind::Validation,
            ClientError::NotLoggedIn | ClientError::PermissionDenied(_) => ErrorKind::Permission,
            ClientError::LockPoisoned(_) => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
