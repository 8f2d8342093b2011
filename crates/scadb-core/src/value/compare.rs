use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by sort surfaces.
///
/// Ordering rules:
/// 1. Canonical variant rank (`Null < Bool < Int < Text < List`)
/// 2. Variant-specific comparison for same-ranked values
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    left.cmp(right)
}

/// Compare a stored value against a literal taken from query text.
///
/// Literals are untyped, so the stored value decides the interpretation:
/// integers compare numerically when the literal parses as one, booleans
/// accept `true`/`false`, everything else compares as rendered text.
/// Returns `None` for `Null` and lists, which have no literal ordering.
#[must_use]
pub fn literal_cmp(stored: &Value, literal: &str) -> Option<Ordering> {
    match stored {
        Value::Null | Value::List(_) => None,
        Value::Int(n) => match literal.trim().parse::<i64>() {
            Ok(lit) => Some(n.cmp(&lit)),
            Err(_) => Some(n.to_string().as_str().cmp(literal)),
        },
        Value::Bool(b) => match literal {
            "true" | "1" => Some(b.cmp(&true)),
            "false" | "0" => Some(b.cmp(&false)),
            _ => None,
        },
        Value::Text(s) => Some(s.as_str().cmp(literal)),
    }
}
