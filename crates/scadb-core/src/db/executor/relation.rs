use crate::{
    db::{
        DbError,
        identity::{CheckId, EndpointId},
        row::Row,
        schema::Relation,
        store::{PartitionStore, with_partition},
    },
    error::InternalError,
};
use tracing::debug;

///
/// RelationalFetcher
///
/// Reads every row of one relation whose `id_check` is in the identifier
/// set. Rows come back unordered.
///

pub(super) struct RelationalFetcher<'a> {
    store: &'a dyn PartitionStore,
}

impl<'a> RelationalFetcher<'a> {
    pub(super) const fn new(store: &'a dyn PartitionStore) -> Self {
        Self { store }
    }

    pub(super) fn fetch(
        &self,
        endpoint: &EndpointId,
        relation: Relation,
        ids: &[CheckId],
    ) -> Result<Vec<Row>, DbError> {
        if ids.is_empty() {
            return Err(InternalError::executor_invariant(format!(
                "{relation} fetch called with an empty identifier set"
            ))
            .into());
        }

        let rows = with_partition(self.store, endpoint, |p| {
            p.run_relational_lookup(relation, ids)
        })?;

        debug!(
            endpoint = %endpoint,
            relation = relation.table(),
            rows = rows.len(),
            "fetched relational rows"
        );

        Ok(rows)
    }

    /// Like `fetch`, with the relation given by name or table name.
    pub(super) fn fetch_named(
        &self,
        endpoint: &EndpointId,
        name: &str,
        ids: &[CheckId],
    ) -> Result<Vec<Row>, DbError> {
        let relation: Relation = name.parse()?;

        self.fetch(endpoint, relation, ids)
    }
}
