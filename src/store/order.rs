use std::cmp::Ordering;

use serde_json::Value;

use crate::domain::{Record, SortKey, value_as_f64, value_to_text};

/// Compares two records field by field along the sort key. Finite numbers
/// order before text and compare numerically; text compares case-folded.
pub fn compare_records(key: &SortKey, left: &Record, right: &Record) -> Ordering {
    for field in &key.fields {
        let ordering = compare_values(left.get(field), right.get(field));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => match (finite_number(left), finite_number(right)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => value_to_text(left)
                .to_lowercase()
                .cmp(&value_to_text(right).to_lowercase()),
        },
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value_as_f64(value).filter(|number| number.is_finite())
}
