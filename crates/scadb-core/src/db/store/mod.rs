//! Module: db::store
//! Responsibility: the per-endpoint partition boundary the executors read
//! through, plus an in-memory adapter implementing it.
//! Does not own: query compilation or validation; adapters receive
//! already-validated `StoreQuery` values.

mod memory;


use crate::db::{
    identity::{CheckId, EndpointId},
    query::StoreQuery,
    row::Row,
    schema::{Relation, TableScope},
};
use thiserror::Error as ThisError;

// re-exports
pub use memory::{MemoryPartition, MemoryStore};

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("partition for endpoint '{endpoint}' is unavailable: {reason}")]
    Unavailable { endpoint: EndpointId, reason: String },

    #[error("partition for endpoint '{endpoint}' rejected the query: {reason}")]
    Rejected { endpoint: EndpointId, reason: String },
}

impl StoreError {
    pub fn unavailable(endpoint: &EndpointId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            endpoint: endpoint.clone(),
            reason: reason.into(),
        }
    }
}

///
/// QueryPage
///
/// Rows of one page plus the match count before pagination.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryPage {
    pub rows: Vec<Row>,
    pub total: u64,
}

///
/// Partition
///
/// An open handle on one endpoint's tables. Handles are short-lived: the
/// executors open one per query and drop it when the query returns.
///

pub trait Partition {
    /// Filtered, sorted, paginated read against one scope.
    fn run_query(&self, scope: &TableScope, query: &StoreQuery) -> Result<QueryPage, StoreError>;

    /// Every row of `relation` whose `id_check` is in `ids`, in any order.
    fn run_relational_lookup(
        &self,
        relation: Relation,
        ids: &[CheckId],
    ) -> Result<Vec<Row>, StoreError>;
}

///
/// PartitionStore
///
/// Opens partitions by endpoint. Shared across fetch threads.
///

pub trait PartitionStore: Send + Sync {
    fn open(&self, endpoint: &EndpointId) -> Result<Box<dyn Partition + '_>, StoreError>;
}

impl<S: PartitionStore + ?Sized> PartitionStore for &S {
    fn open(&self, endpoint: &EndpointId) -> Result<Box<dyn Partition + '_>, StoreError> {
        (**self).open(endpoint)
    }
}

/// Run `f` against a partition handle held only for the duration of `f`.
pub(crate) fn with_partition<T>(
    store: &dyn PartitionStore,
    endpoint: &EndpointId,
    f: impl FnOnce(&dyn Partition) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let partition = store.open(endpoint)?;

    f(partition.as_ref())
}
