//! Document-level diff: compare two top-level field maps.
//!
//! Field values are compared by deep equality and never descended into. A
//! nested object with one differing leaf surfaces as a single [`Change`]
//! holding the whole before and after sub-value.
//!
//! Numbers compare by value: `1` and `1.0` are the same JSON number.

use serde_json::{Number, Value};

use scds_types::{Change, Document, Revision};

/// Compute the revision that turns `old` into `new`.
///
/// An empty document stands for "does not exist". Fields only in `new` are
/// additions, fields only in `old` are removals, and fields in both with
/// differing values are changes. Returns `None` when nothing differs.
///
/// The returned revision has version and time `0`; the caller stamps it.
pub fn diff(old: &Document, new: &Document) -> Option<Revision> {
    let mut rev = Revision::default();

    for (field, old_val) in old {
        match new.get(field) {
            Some(new_val) if !values_equal(old_val, new_val) => {
                rev.changes
                    .insert(field.clone(), Change::new(old_val.clone(), new_val.clone()));
            }
            Some(_) => {}
            None => {
                rev.removals.insert(field.clone(), old_val.clone());
            }
        }
    }

    for (field, new_val) in new {
        if !old.contains_key(field) {
            rev.additions.insert(field.clone(), new_val.clone());
        }
    }

    (!rev.is_empty()).then_some(rev)
}

/// Deep equality of two field values, comparing numbers by value.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// The revision that creates `value` from nothing.
pub fn diff_from_empty(value: &Document) -> Option<Revision> {
    diff(&Document::new(), value)
}
