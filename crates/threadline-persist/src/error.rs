use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Populate depth {depth} exceeds maximum of {max}")]
    PopulateTooDeep { depth: usize, max: usize },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Coarse classification of a failure, for callers that need to branch on
/// the cause instead of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    ConnectionFailure,
    WriteConflict,
    Unknown,
}

impl PersistError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            #[cfg(feature = "mongodb")]
            PersistError::Database(e) => classify_driver_error(e),
            PersistError::ThreadNotFound(_) | PersistError::UserNotFound(_) => ErrorKind::NotFound,
            PersistError::InvalidObjectId(_)
            | PersistError::InvalidPagination(_)
            | PersistError::PopulateTooDeep { .. } => ErrorKind::InvalidInput,
            PersistError::Connection(_) => ErrorKind::ConnectionFailure,
            PersistError::BsonSerialization(_)
            | PersistError::BsonDeserialization(_)
            | PersistError::Internal(_) => ErrorKind::Unknown,
        }
    }
}

#[cfg(feature = "mongodb")]
fn classify_driver_error(error: &mongodb::error::Error) -> ErrorKind {
    use mongodb::error::{ErrorKind as DriverKind, WriteFailure};

    const DUPLICATE_KEY: i32 = 11000;
    const WRITE_CONFLICT: i32 = 112;

    match error.kind.as_ref() {
        DriverKind::Io(_)
        | DriverKind::ServerSelection { .. }
        | DriverKind::ConnectionPoolCleared { .. }
        | DriverKind::DnsResolve { .. } => ErrorKind::ConnectionFailure,
        DriverKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => {
            ErrorKind::WriteConflict
        }
        DriverKind::Command(e) if e.code == WRITE_CONFLICT || e.code == DUPLICATE_KEY => {
            ErrorKind::WriteConflict
        }
        _ => ErrorKind::Unknown,
    }
}

/// The operation an [`ActionError`] was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateThread,
    FetchThreadById,
    AddComment,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Action::CreateThread => "creating thread",
            Action::FetchThreadById => "fetching thread by id",
            Action::AddComment => "adding comment to thread",
        };
        f.write_str(verb)
    }
}

/// Error returned at the boundary of a thread action.
///
/// Renders as `Error <action>: <cause>` while keeping the underlying
/// [`PersistError`] reachable through `source()` and [`ActionError::kind`].
#[derive(Error, Debug)]
#[error("Error {action}: {source}")]
pub struct ActionError {
    pub action: Action,
    #[source]
    pub source: PersistError,
}

impl ActionError {
    pub fn new(action: Action, source: PersistError) -> Self {
        Self { action, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;
