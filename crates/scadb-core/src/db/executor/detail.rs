use crate::{
    db::{
        DbError,
        identity::{CheckId, EndpointId},
        query::{SortSpec, StoreQuery},
        row::Row,
        schema::{CHECK_ID_FIELD, TableScope},
        store::{PartitionStore, with_partition},
    },
    error::InternalError,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

///
/// CheckDetailFetcher
///
/// Reads full check rows for an already-resolved identifier set. Filters
/// are not re-applied; only the caller's sort is.
///

pub(super) struct CheckDetailFetcher<'a> {
    store: &'a dyn PartitionStore,
}

impl<'a> CheckDetailFetcher<'a> {
    pub(super) const fn new(store: &'a dyn PartitionStore) -> Self {
        Self { store }
    }

    /// Rows for exactly `ids`: in sort order when `sort` is given, else in
    /// the order of `ids`.
    pub(super) fn fetch(
        &self,
        endpoint: &EndpointId,
        ids: &[CheckId],
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Row>, DbError> {
        if ids.is_empty() {
            return Err(InternalError::executor_invariant(
                "detail fetch called with an empty identifier set",
            )
            .into());
        }

        let scope = TableScope::Checks { ids: ids.to_vec() };
        let query = StoreQuery {
            sort: sort.cloned(),
            ..StoreQuery::default()
        };
        let page = with_partition(self.store, endpoint, |p| p.run_query(&scope, &query))?;

        let mut position = BTreeMap::new();
        for (i, id) in ids.iter().enumerate() {
            position.entry(*id).or_insert(i);
        }
        let mut seen = BTreeSet::new();
        let mut rows = Vec::with_capacity(ids.len());
        for row in page.rows {
            let id = row.check_id(CHECK_ID_FIELD)?;
            if position.contains_key(&id) && seen.insert(id) {
                rows.push((id, row));
            }
        }

        if sort.is_none() {
            rows.sort_by_key(|(id, _)| position.get(id).copied());
        }

        debug!(
            endpoint = %endpoint,
            requested = ids.len(),
            fetched = rows.len(),
            "fetched check details"
        );

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}
