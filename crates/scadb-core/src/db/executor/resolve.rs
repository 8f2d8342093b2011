use crate::db::{
    DbError,
    identity::{CheckId, EndpointId, PolicyId},
    query::StoreQuery,
    schema::{CHECK_ID_FIELD, TableScope},
    store::{PartitionStore, with_partition},
};
use std::collections::BTreeSet;
use tracing::debug;

///
/// ResolvedIds
///
/// One page of matching check identifiers plus the match count before
/// pagination.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedIds {
    pub ids: Vec<CheckId>,
    pub total: u64,
}

impl ResolvedIds {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

///
/// CheckIdResolver
///
/// Runs the caller's filters against the joined check view and keeps only
/// the distinct check identifiers.
///

pub(super) struct CheckIdResolver<'a> {
    store: &'a dyn PartitionStore,
}

impl<'a> CheckIdResolver<'a> {
    pub(super) const fn new(store: &'a dyn PartitionStore) -> Self {
        Self { store }
    }

    pub(super) fn resolve(
        &self,
        endpoint: &EndpointId,
        policy_id: &PolicyId,
        query: &StoreQuery,
    ) -> Result<ResolvedIds, DbError> {
        let scope = TableScope::CheckIds {
            policy_id: policy_id.clone(),
        };
        let page = with_partition(self.store, endpoint, |p| p.run_query(&scope, query))?;

        let mut seen = BTreeSet::new();
        let mut ids = Vec::with_capacity(page.rows.len());
        for row in &page.rows {
            let id = row.check_id(CHECK_ID_FIELD)?;
            if seen.insert(id) {
                ids.push(id);
            }
        }

        debug!(
            endpoint = %endpoint,
            policy_id = %policy_id,
            ids = ids.len(),
            total = page.total,
            "resolved check ids"
        );

        Ok(ResolvedIds {
            ids,
            total: page.total,
        })
    }
}
