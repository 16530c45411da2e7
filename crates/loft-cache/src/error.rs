use std::path::PathBuf;

/// Errors surfaced by the cache.
///
/// Underlying SQLite and I/O failures are not re-wrapped here; they ride
/// inside `anyhow::Error` with context attached, and callers that need the
/// cache-level taxonomy `downcast_ref` to this type.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("{0} was not found in the cache")]
    NotFound(String),
    #[error("unknown resource state '{0}'")]
    InvalidState(String),
    #[error("unknown resource kind '{0}'")]
    UnknownKind(String),
    #[error("resource '{path}' has no remote identifier; cached content cannot be located")]
    MissingResourceId { path: String },
    #[error("resource '{path}' has no assigned identity")]
    MissingId { path: String },
    #[error("resource '{path}' already carries identity {id}")]
    IdentityAssigned { path: String, id: i64 },
    #[error(
        "metadata db at {} has schema version {found}, expected {expected}",
        path.display()
    )]
    SchemaVersion {
        path: PathBuf,
        expected: i64,
        found: i64,
    },
}
