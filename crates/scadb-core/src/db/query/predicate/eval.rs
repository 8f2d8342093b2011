use crate::{
    db::{
        query::{
            SearchSpec, SortOrder, SortSpec,
            predicate::{CompareOp, ComparePredicate, Predicate},
        },
        row::Row,
    },
    value::{TextMode, Value, canonical_cmp, literal_cmp},
};
use std::{cmp::Ordering, mem::discriminant};

///
/// FieldPresence
///
/// Result of reading a field during evaluation. Distinguishes a missing
/// column from a present column holding `Null`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldPresence<'a> {
    Present(&'a Value),
    Missing,
}

///
/// RowView
///
/// Anything that can expose named fields to predicate evaluation: a stored
/// row, or a joined view stitched together by an adapter.
///

pub trait RowView {
    fn field(&self, name: &str) -> FieldPresence<'_>;
}

impl RowView for Row {
    fn field(&self, name: &str) -> FieldPresence<'_> {
        self.get(name)
            .map_or(FieldPresence::Missing, FieldPresence::Present)
    }
}

///
/// Evaluate a predicate against a single row.
///
/// Pure runtime evaluation: no schema access and no validation. Comparisons
/// against missing fields or `Null` evaluate to `false`, as SQL `NULL` does.
///
#[must_use]
pub fn eval<R: RowView + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(preds) => preds.iter().all(|p| eval(row, p)),
        Predicate::Or(preds) => preds.iter().any(|p| eval(row, p)),
        Predicate::Compare(cmp) => eval_compare(row, cmp),
    }
}

fn eval_compare<R: RowView + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    match row.field(&cmp.field) {
        FieldPresence::Present(stored) => compare(stored, cmp.op, &cmp.value),
        FieldPresence::Missing => false,
    }
}

fn compare(stored: &Value, op: CompareOp, operand: &Value) -> bool {
    match stored {
        Value::Null => false,
        Value::List(items) => match op {
            CompareOp::Ne => !items.iter().any(|item| compare(item, CompareOp::Eq, operand)),
            _ => items.iter().any(|item| compare(item, op, operand)),
        },
        _ => match op {
            CompareOp::Like => stored.rendered_contains(&operand.render(), TextMode::Ci),
            CompareOp::Eq => ordering(stored, operand) == Some(Ordering::Equal),
            CompareOp::Ne => matches!(ordering(stored, operand), Some(o) if o != Ordering::Equal),
            CompareOp::Lt => ordering(stored, operand) == Some(Ordering::Less),
            CompareOp::Gt => ordering(stored, operand) == Some(Ordering::Greater),
        },
    }
}

// Typed operands of the same variant compare directly; anything else is
// treated as a literal against the stored value.
fn ordering(stored: &Value, operand: &Value) -> Option<Ordering> {
    match operand {
        Value::Null | Value::List(_) => None,
        Value::Text(literal) => literal_cmp(stored, literal),
        _ if discriminant(stored) == discriminant(operand) => Some(canonical_cmp(stored, operand)),
        _ => literal_cmp(stored, &operand.render()),
    }
}

/// Free-text search over `search.fields`.
///
/// A row matches when any listed field contains the search value
/// case-insensitively; `negation` inverts the outcome.
#[must_use]
pub fn search_matches<R: RowView + ?Sized>(row: &R, search: &SearchSpec) -> bool {
    let hit = search.fields.iter().any(|field| match row.field(field) {
        FieldPresence::Present(value) => value.rendered_contains(&search.value, TextMode::Ci),
        FieldPresence::Missing => false,
    });

    hit != search.negation
}

/// Stable multi-field sort. Missing fields sort as `Null`.
pub fn sort_rows<R: RowView>(rows: &mut [R], sort: &SortSpec) {
    rows.sort_by(|a, b| {
        let ordering = sort
            .fields
            .iter()
            .map(|field| canonical_cmp(field_or_null(a, field), field_or_null(b, field)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal);

        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn field_or_null<'a, R: RowView>(row: &'a R, field: &str) -> &'a Value {
    const NULL: &Value = &Value::Null;

    match row.field(field) {
        FieldPresence::Present(value) => value,
        FieldPresence::Missing => NULL,
    }
}
