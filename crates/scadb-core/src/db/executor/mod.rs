//! Module: db::executor
//! Responsibility: the two read operations over one endpoint partition:
//! the policy listing and the enriched check retrieval.
//! Does not own: authorization or multi-endpoint batching; the facade does.
//! Boundary: every caller-supplied query part is compiled and validated
//! before any partition is opened.

mod detail;
mod merge;
mod policy;
mod relation;
mod resolve;


use crate::{
    config::ScaConfig,
    db::{
        DbError,
        identity::{CheckId, EndpointId, KnownEndpoints, PolicyId},
        query::{QueryCompiler, QuerySpec, SortSpec, StoreQuery},
        response::{CHECK_MESSAGES, FailedItem, POLICY_MESSAGES, ResultEnvelope},
        row::{EnrichedCheck, Row},
        schema::{Relation, ScopeKind},
        store::PartitionStore,
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{ExecKind, MetricsEvent, Span, record},
};
use detail::CheckDetailFetcher;
use merge::EnrichmentMerger;
use policy::PolicyListQuery;
use relation::RelationalFetcher;
use resolve::CheckIdResolver;
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, info, warn};

// re-exports
pub use resolve::ResolvedIds;

///
/// FetchedChecks
///
/// Outputs of the three post-resolution fetches.
///

struct FetchedChecks {
    details: Vec<Row>,
    compliance: Vec<Row>,
    rules: Vec<Row>,
}

///
/// ScaExecutor
///
/// Per-endpoint executor over a partition store. Cheap to construct; holds
/// only borrows.
///

#[derive(Clone, Copy)]
pub struct ScaExecutor<'a> {
    store: &'a dyn PartitionStore,
    endpoints: &'a dyn KnownEndpoints,
    config: &'a ScaConfig,
}

impl<'a> ScaExecutor<'a> {
    #[must_use]
    pub const fn new(
        store: &'a dyn PartitionStore,
        endpoints: &'a dyn KnownEndpoints,
        config: &'a ScaConfig,
    ) -> Self {
        Self {
            store,
            endpoints,
            config,
        }
    }

    //
    // Operations
    //

    /// List the policy summaries of one endpoint.
    pub fn get_policies(
        &self,
        endpoint: &EndpointId,
        spec: &QuerySpec,
    ) -> Result<ResultEnvelope<Row>, DbError> {
        let mut envelope = ResultEnvelope::empty(POLICY_MESSAGES);
        if !self.endpoints.contains(endpoint) {
            Self::record_not_found(&mut envelope, endpoint);
            return Ok(envelope);
        }

        let query = self.compile_policy_query(spec)?;
        let mut span = Span::new(ExecKind::Policies, endpoint.as_str());

        let page = PolicyListQuery::new(self.store).execute(endpoint, &query)?;
        record(MetricsEvent::PartitionQuery {
            scope: ScopeKind::Policies,
        });
        span.set_rows(page.rows.len() as u64);
        envelope.extend_affected(page.rows);
        envelope.set_total(page.total);

        info!(
            endpoint = %endpoint,
            items = envelope.affected_items().len(),
            total = envelope.total_affected_items(),
            "policies returned"
        );

        Ok(envelope)
    }

    /// Retrieve one page of a policy's checks, each carrying its compliance
    /// mappings and rule descriptors.
    pub fn get_enriched_checks(
        &self,
        policy_id: &PolicyId,
        endpoint: &EndpointId,
        spec: &QuerySpec,
    ) -> Result<ResultEnvelope<EnrichedCheck>, DbError> {
        let mut envelope = ResultEnvelope::empty(CHECK_MESSAGES);
        if !self.endpoints.contains(endpoint) {
            Self::record_not_found(&mut envelope, endpoint);
            return Ok(envelope);
        }

        let id_query = self.compile_check_id_query(spec)?;
        let sort = self.compile_detail_sort(spec)?;
        let mut span = Span::new(ExecKind::Checks, endpoint.as_str());

        let resolved = CheckIdResolver::new(self.store).resolve(endpoint, policy_id, &id_query)?;
        record(MetricsEvent::PartitionQuery {
            scope: ScopeKind::CheckIds,
        });
        record(MetricsEvent::IdsResolved {
            endpoint: endpoint.as_str(),
            ids: resolved.ids.len() as u64,
        });

        // An empty page reports a zero total even when the offset skipped
        // past matches; `resolved.total` only applies once checks are merged.
        if resolved.is_empty() {
            record(MetricsEvent::EmptyShortCircuit {
                endpoint: endpoint.as_str(),
            });
            debug!(endpoint = %endpoint, policy_id = %policy_id, "no matching checks");

            return Ok(envelope);
        }

        let fetched = self.fetch_all(endpoint, &resolved.ids, sort.as_ref())?;
        record(MetricsEvent::PartitionQuery {
            scope: ScopeKind::Checks,
        });

        let mut merger = EnrichmentMerger::new(&resolved.ids);
        for (relation, rows) in [
            (Relation::Compliance, fetched.compliance),
            (Relation::Rules, fetched.rules),
        ] {
            let fetched_rows = rows.len() as u64;
            let orphans = merger.absorb(relation, rows)?;
            record(MetricsEvent::RelationRows {
                relation,
                rows: fetched_rows,
                orphans,
            });
        }
        let checks = merger.finish(fetched.details)?;

        span.set_rows(checks.len() as u64);
        envelope.extend_affected(checks);
        envelope.set_total(resolved.total);

        info!(
            endpoint = %endpoint,
            policy_id = %policy_id,
            items = envelope.affected_items().len(),
            total = envelope.total_affected_items(),
            "checks returned"
        );

        Ok(envelope)
    }

    //
    // Components
    //

    /// Distinct identifiers of the checks matching `spec`, one page of them,
    /// plus the match count before pagination.
    pub fn resolve_check_ids(
        &self,
        endpoint: &EndpointId,
        policy_id: &PolicyId,
        spec: &QuerySpec,
    ) -> Result<ResolvedIds, DbError> {
        let query = self.compile_check_id_query(spec)?;

        CheckIdResolver::new(self.store).resolve(endpoint, policy_id, &query)
    }

    /// Full check rows for a non-empty identifier set.
    pub fn fetch_check_details(
        &self,
        endpoint: &EndpointId,
        ids: &[CheckId],
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Row>, DbError> {
        let sort = QueryCompiler::new(ScopeKind::Checks, &self.config.query).sort(sort)?;

        CheckDetailFetcher::new(self.store).fetch(endpoint, ids, sort.as_ref())
    }

    /// Rows of the relation named `relation` whose `id_check` is in `ids`.
    pub fn fetch_relation(
        &self,
        endpoint: &EndpointId,
        relation: &str,
        ids: &[CheckId],
    ) -> Result<Vec<Row>, DbError> {
        RelationalFetcher::new(self.store).fetch_named(endpoint, relation, ids)
    }

    //
    // Compilation
    //

    fn compile_policy_query(&self, spec: &QuerySpec) -> Result<StoreQuery, DbError> {
        let compiler = QueryCompiler::new(ScopeKind::Policies, &self.config.query);

        Ok(StoreQuery {
            predicate: compiler.predicate(spec)?,
            search: compiler.search(spec.search.as_ref())?,
            sort: compiler.sort(spec.sort.as_ref())?,
            page: Some(compiler.page(spec)?),
            select: compiler.select(spec.select.as_ref())?,
        })
    }

    fn compile_check_id_query(&self, spec: &QuerySpec) -> Result<StoreQuery, DbError> {
        let compiler = QueryCompiler::new(ScopeKind::CheckIds, &self.config.query);

        Ok(StoreQuery {
            predicate: compiler.predicate(spec)?,
            search: compiler.search(spec.search.as_ref())?,
            sort: None,
            page: Some(compiler.page(spec)?),
            select: None,
        })
    }

    fn compile_detail_sort(&self, spec: &QuerySpec) -> Result<Option<SortSpec>, DbError> {
        let compiler = QueryCompiler::new(ScopeKind::Checks, &self.config.query);

        Ok(compiler.sort(spec.sort.as_ref())?)
    }

    //
    // Fetch
    //

    fn fetch_all(
        &self,
        endpoint: &EndpointId,
        ids: &[CheckId],
        sort: Option<&SortSpec>,
    ) -> Result<FetchedChecks, DbError> {
        let details = CheckDetailFetcher::new(self.store);
        let relations = RelationalFetcher::new(self.store);

        if !self.config.fetch.parallel {
            return Ok(FetchedChecks {
                details: details.fetch(endpoint, ids, sort)?,
                compliance: relations.fetch(endpoint, Relation::Compliance, ids)?,
                rules: relations.fetch(endpoint, Relation::Rules, ids)?,
            });
        }

        let (details, compliance, rules) = thread::scope(|s| {
            let d = s.spawn(|| details.fetch(endpoint, ids, sort));
            let c = s.spawn(|| relations.fetch(endpoint, Relation::Compliance, ids));
            let r = s.spawn(|| relations.fetch(endpoint, Relation::Rules, ids));

            (join(d, "detail"), join(c, "compliance"), join(r, "rules"))
        });

        Ok(FetchedChecks {
            details: details?,
            compliance: compliance?,
            rules: rules?,
        })
    }

    fn record_not_found<T>(envelope: &mut ResultEnvelope<T>, endpoint: &EndpointId) {
        warn!(endpoint = %endpoint, "endpoint not found");
        record(MetricsEvent::EndpointNotFound {
            endpoint: endpoint.as_str(),
        });

        envelope.add_failed_item(endpoint.clone(), FailedItem::resource_not_found(endpoint));
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T, DbError>>, what: &str) -> Result<T, DbError> {
    handle.join().map_err(|_| {
        InternalError::new(
            ErrorClass::Internal,
            ErrorOrigin::Executor,
            format!("{what} fetch thread panicked"),
        )
    })?
}
