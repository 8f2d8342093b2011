use crate::db::{
    DbError,
    identity::EndpointId,
    query::StoreQuery,
    schema::TableScope,
    store::{PartitionStore, QueryPage, with_partition},
};
use tracing::debug;

///
/// PolicyListQuery
///
/// Single filtered, sorted, paginated read of the policy table.
///

pub(super) struct PolicyListQuery<'a> {
    store: &'a dyn PartitionStore,
}

impl<'a> PolicyListQuery<'a> {
    pub(super) const fn new(store: &'a dyn PartitionStore) -> Self {
        Self { store }
    }

    pub(super) fn execute(
        &self,
        endpoint: &EndpointId,
        query: &StoreQuery,
    ) -> Result<QueryPage, DbError> {
        let page = with_partition(self.store, endpoint, |p| {
            p.run_query(&TableScope::Policies, query)
        })?;

        debug!(
            endpoint = %endpoint,
            rows = page.rows.len(),
            total = page.total,
            "listed policies"
        );

        Ok(page)
    }
}
