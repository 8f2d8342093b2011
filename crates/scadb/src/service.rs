//! Module: service
//! Responsibility: the public read surface: authorization and endpoint
//! lookup in front of the per-endpoint executors, plus batch helpers.
//! Does not own: query semantics or storage.

use crate::Error;
use scadb_core::{
    config::ScaConfig,
    db::{
        ScaExecutor,
        identity::{EndpointId, KnownEndpoints, PolicyId},
        query::QuerySpec,
        response::{CHECK_MESSAGES, POLICY_MESSAGES, ResultEnvelope},
        row::{EnrichedCheck, Row},
        store::PartitionStore,
    },
};
use std::slice;
use tracing::debug;

/// Action checked before any endpoint is read.
pub const READ_ACTION: &str = "sca:read";

/// Resource name checked for `endpoint`.
#[must_use]
pub fn endpoint_resource(endpoint: &EndpointId) -> String {
    format!("agent:id:{endpoint}")
}

///
/// Authorizer
///
/// Decides whether the current caller may perform `action` on `resource`.
///

pub trait Authorizer: Send + Sync {
    fn is_allowed(&self, action: &str, resource: &str) -> bool;
}

///
/// AllowAll
///

#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_allowed(&self, _: &str, _: &str) -> bool {
        true
    }
}

///
/// Sca
///
/// Read service over a partition store. Denied endpoints are dropped from
/// the working set before lookup; unknown endpoints become failed items;
/// every other failure propagates.
///

pub struct Sca<S, K, A = AllowAll> {
    store: S,
    endpoints: K,
    authorizer: A,
    config: ScaConfig,
}

impl<S, K, A> Sca<S, K, A>
where
    S: PartitionStore,
    K: KnownEndpoints,
    A: Authorizer,
{
    #[must_use]
    pub fn new(store: S, endpoints: K, authorizer: A) -> Self {
        Self {
            store,
            endpoints,
            authorizer,
            config: ScaConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ScaConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ScaConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The core executor this service delegates to.
    #[must_use]
    pub fn executor(&self) -> ScaExecutor<'_> {
        ScaExecutor::new(&self.store, &self.endpoints, &self.config)
    }

    //
    // Single endpoint
    //

    pub fn get_policies(
        &self,
        endpoint: &EndpointId,
        spec: &QuerySpec,
    ) -> Result<ResultEnvelope<Row>, Error> {
        self.get_policies_batch(slice::from_ref(endpoint), spec)
    }

    pub fn get_enriched_checks(
        &self,
        policy_id: &PolicyId,
        endpoint: &EndpointId,
        spec: &QuerySpec,
    ) -> Result<ResultEnvelope<EnrichedCheck>, Error> {
        self.get_enriched_checks_batch(policy_id, slice::from_ref(endpoint), spec)
    }

    //
    // Batch
    //

    /// Policies of every endpoint in order; stops at the first propagated
    /// failure.
    pub fn get_policies_batch(
        &self,
        endpoints: &[EndpointId],
        spec: &QuerySpec,
    ) -> Result<ResultEnvelope<Row>, Error> {
        let executor = self.executor();
        let mut envelope = ResultEnvelope::empty(POLICY_MESSAGES);

        for endpoint in self.authorized(endpoints) {
            envelope.merge(executor.get_policies(endpoint, spec)?);
        }

        Ok(envelope)
    }

    /// Enriched checks of `policy_id` for every endpoint in order; stops at
    /// the first propagated failure.
    pub fn get_enriched_checks_batch(
        &self,
        policy_id: &PolicyId,
        endpoints: &[EndpointId],
        spec: &QuerySpec,
    ) -> Result<ResultEnvelope<EnrichedCheck>, Error> {
        let executor = self.executor();
        let mut envelope = ResultEnvelope::empty(CHECK_MESSAGES);

        for endpoint in self.authorized(endpoints) {
            envelope.merge(executor.get_enriched_checks(policy_id, endpoint, spec)?);
        }

        Ok(envelope)
    }

    fn authorized<'e>(&self, endpoints: &'e [EndpointId]) -> impl Iterator<Item = &'e EndpointId> {
        endpoints.iter().filter(|endpoint| {
            let allowed = self
                .authorizer
                .is_allowed(READ_ACTION, &endpoint_resource(endpoint));
            if !allowed {
                debug!(endpoint = %endpoint, "endpoint denied");
            }

            allowed
        })
    }
}
