pub mod executor;
pub mod identity;
pub mod query;
pub mod response;
pub mod row;
pub mod schema;
pub mod store;

use crate::{
    db::{query::QueryError, schema::RelationError, store::StoreError},
    error::InternalError,
};
use thiserror::Error as ThisError;

// re-exports
pub use executor::ScaExecutor;

///
/// DbError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DbError {
    #[error(transparent)]
    QueryError(#[from] QueryError),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error(transparent)]
    RelationError(#[from] RelationError),

    #[error(transparent)]
    InternalError(#[from] InternalError),
}
