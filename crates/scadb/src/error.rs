use derive_more::Display;
use scadb_core::{
    config::ConfigError,
    db::{
        DbError, identity::EndpointId, query::QueryError, response::FailedItem,
        schema::RelationError, store::StoreError,
    },
    error::{ErrorOrigin as CoreErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Lift a per-endpoint failed item into an error.
    #[must_use]
    pub fn from_failed_item(endpoint: &EndpointId, item: &FailedItem) -> Self {
        let kind = if item.is_resource_not_found() {
            ErrorKind::ResourceNotFound
        } else {
            ErrorKind::Internal
        };

        Self::new(
            kind,
            ErrorOrigin::Executor,
            format!("endpoint '{endpoint}': {} (code {})", item.message, item.code),
        )
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::QueryError(err) => err.into(),
            DbError::StoreError(err) => err.into(),
            DbError::RelationError(err) => err.into(),
            DbError::InternalError(err) => err.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(ErrorKind::Internal, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Self::new(ErrorKind::InvalidQuery, ErrorOrigin::Query, err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let kind = match err {
            StoreError::Unavailable { .. } => ErrorKind::StoreUnavailable,
            StoreError::Rejected { .. } => ErrorKind::InvalidQuery,
        };

        Self::new(kind, ErrorOrigin::Store, err.to_string())
    }
}

impl From<RelationError> for Error {
    fn from(err: RelationError) -> Self {
        Self::new(ErrorKind::UnknownRelation, ErrorOrigin::Executor, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Internal, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The endpoint is not known.
    ResourceNotFound,

    /// The endpoint's partition could not be opened.
    StoreUnavailable,

    /// Query shape is invalid (unknown fields, bad `q`, limit out of range).
    InvalidQuery,

    /// A relation name outside `compliance` and `rules`.
    UnknownRelation,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Executor,
    Query,
    Response,
    Store,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Executor => Self::Executor,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Response => Self::Response,
            CoreErrorOrigin::Store => Self::Store,
        }
    }
}
