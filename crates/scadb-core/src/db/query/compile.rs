use crate::{
    config::QueryConfig,
    db::{
        query::{
            FilterValue, PageSpec, QueryError, QuerySpec, SearchSpec, SortSpec, predicate,
            predicate::Predicate,
        },
        schema::ScopeKind,
    },
};
use std::collections::BTreeMap;

///
/// QueryCompiler
///
/// Turns the parts of a `QuerySpec` into their validated `StoreQuery` form
/// for one scope. Each executor picks the parts its read shape honours.
///

pub(crate) struct QueryCompiler<'a> {
    scope: ScopeKind,
    limits: &'a QueryConfig,
}

impl<'a> QueryCompiler<'a> {
    pub(crate) const fn new(scope: ScopeKind, limits: &'a QueryConfig) -> Self {
        Self { scope, limits }
    }

    fn check_field(&self, field: &str) -> Result<(), QueryError> {
        if self.scope.fields().contains(&field) {
            Ok(())
        } else {
            Err(QueryError::UnknownField {
                scope: self.scope.label(),
                field: field.to_string(),
            })
        }
    }

    /// The `q` expression AND-ed with the filter map.
    pub(crate) fn predicate(&self, spec: &QuerySpec) -> Result<Option<Predicate>, QueryError> {
        let q = match spec.q.as_deref() {
            Some(q) => predicate::parse(q)?,
            None => None,
        };
        let predicate = Predicate::conjoin(q, Self::filters(&spec.filters));

        if let Some(predicate) = &predicate {
            for field in predicate.fields() {
                self.check_field(field)?;
            }
        }

        Ok(predicate)
    }

    // Equality per entry, OR within a list, AND across entries.
    // An empty value list places no constraint.
    fn filters(filters: &BTreeMap<String, FilterValue>) -> Option<Predicate> {
        let mut terms: Vec<Predicate> = filters
            .iter()
            .filter_map(|(field, value)| match value {
                FilterValue::One(value) => Some(Predicate::eq(field.as_str(), value.clone())),
                FilterValue::Any(values) if values.is_empty() => None,
                FilterValue::Any(values) if values.len() == 1 => {
                    Some(Predicate::eq(field.as_str(), values[0].clone()))
                }
                FilterValue::Any(values) => Some(Predicate::or(
                    values
                        .iter()
                        .map(|value| Predicate::eq(field.as_str(), value.clone()))
                        .collect(),
                )),
            })
            .collect();

        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(Predicate::and(terms)),
        }
    }

    /// Search with explicit fields; an empty list expands to the whole scope.
    pub(crate) fn search(
        &self,
        search: Option<&SearchSpec>,
    ) -> Result<Option<SearchSpec>, QueryError> {
        let Some(search) = search else {
            return Ok(None);
        };

        let mut search = search.clone();
        if search.fields.is_empty() {
            search.fields = self
                .scope
                .fields()
                .iter()
                .map(ToString::to_string)
                .collect();
        } else {
            for field in &search.fields {
                self.check_field(field)?;
            }
        }

        Ok(Some(search))
    }

    pub(crate) fn sort(&self, sort: Option<&SortSpec>) -> Result<Option<SortSpec>, QueryError> {
        let Some(sort) = sort else {
            return Ok(None);
        };

        if sort.fields.is_empty() {
            return Err(QueryError::EmptyFieldList { what: "sort" });
        }
        for field in &sort.fields {
            self.check_field(field)?;
        }

        Ok(Some(sort.clone()))
    }

    pub(crate) fn page(&self, spec: &QuerySpec) -> Result<PageSpec, QueryError> {
        let limit = spec.limit.unwrap_or(self.limits.default_limit);
        if limit == 0 || limit > self.limits.max_limit {
            return Err(QueryError::LimitOutOfRange {
                limit,
                max: self.limits.max_limit,
            });
        }

        Ok(PageSpec {
            offset: spec.offset,
            limit,
        })
    }

    pub(crate) fn select(
        &self,
        select: Option<&Vec<String>>,
    ) -> Result<Option<Vec<String>>, QueryError> {
        let Some(select) = select else {
            return Ok(None);
        };

        if select.is_empty() {
            return Err(QueryError::EmptyFieldList { what: "select" });
        }
        for field in select {
            self.check_field(field)?;
        }

        Ok(Some(select.clone()))
    }
}
