/// Coarse error classification shared by every crate in the workspace.
///
/// The presentation layer only needs to know which of these buckets a
/// failure falls into to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An identifier or login key did not match any record.
    NotFound,
    /// Missing required field, duplicate key or otherwise invalid input.
    Validation,
    /// The session user is not allowed to perform the operation.
    Permission,
    /// Storage read/write failure. Always recovered locally.
    Persistence,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Validation => "validation error",
            ErrorKind::Permission => "permission denied",
            ErrorKind::Persistence => "persistence error",
        };
        f.write_str(s)
    }
}
