use crate::{
    db::{
        identity::CheckId,
        row::{EnrichedCheck, RelationRecord, Row},
        schema::{CHECK_ID_FIELD, Relation},
    },
    error::InternalError,
};
use std::collections::BTreeMap;
use tracing::warn;

///
/// CheckRelations
///
/// Per-check accumulator of relation records.
///

#[derive(Debug, Default)]
struct CheckRelations {
    compliance: Vec<RelationRecord>,
    rules: Vec<RelationRecord>,
}

impl CheckRelations {
    const fn records_mut(&mut self, relation: Relation) -> &mut Vec<RelationRecord> {
        match relation {
            Relation::Compliance => &mut self.compliance,
            Relation::Rules => &mut self.rules,
        }
    }
}

///
/// EnrichmentMerger
///
/// Attaches compliance and rule records to fetched check rows. Seeded with
/// the resolved identifier set; relational rows outside it are dropped.
///

#[derive(Debug)]
pub(super) struct EnrichmentMerger {
    relations: BTreeMap<CheckId, CheckRelations>,
}

impl EnrichmentMerger {
    pub(super) fn new(ids: &[CheckId]) -> Self {
        Self {
            relations: ids
                .iter()
                .map(|id| (*id, CheckRelations::default()))
                .collect(),
        }
    }

    /// Fold relational rows into the accumulators; returns the number of
    /// orphan rows dropped.
    pub(super) fn absorb(
        &mut self,
        relation: Relation,
        rows: Vec<Row>,
    ) -> Result<u64, InternalError> {
        let mut orphans = 0u64;

        for row in rows {
            let (id, record) = RelationRecord::from_relational_row(row)?;
            match self.relations.get_mut(&id) {
                Some(entry) => entry.records_mut(relation).push(record),
                None => orphans = orphans.saturating_add(1),
            }
        }

        if orphans > 0 {
            warn!(
                relation = relation.table(),
                orphans, "dropped relational rows outside the resolved id set"
            );
        }

        Ok(orphans)
    }

    /// Attach accumulated records to `checks`, keeping their order.
    pub(super) fn finish(mut self, checks: Vec<Row>) -> Result<Vec<EnrichedCheck>, InternalError> {
        let mut enriched = Vec::with_capacity(checks.len());

        for check in checks {
            let id = check.check_id(CHECK_ID_FIELD)?;
            let relations = self.relations.remove(&id).ok_or_else(|| {
                InternalError::executor_invariant(format!(
                    "check {id} has no relation accumulator"
                ))
            })?;

            enriched.push(EnrichedCheck {
                check,
                compliance: relations.compliance,
                rules: relations.rules,
            });
        }

        if !self.relations.is_empty() {
            warn!(
                missing = self.relations.len(),
                "resolved checks absent from detail rows"
            );
        }

        Ok(enriched)
    }
}
