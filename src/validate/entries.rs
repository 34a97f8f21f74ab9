use std::collections::HashMap;

use serde_json::Value;

use crate::{
    domain::{EntrySchema, FieldSchema, Record, field_text, value_as_f64},
    form::{FieldErrors, entry_slot},
};

use super::{ValidationContext, checks::check_field};

/// Checks a composite field: entry count, per-entry rules, and that no two
/// entries share the key or sequence sub-field.
pub(crate) fn check_entries(
    field: &FieldSchema,
    entry: &EntrySchema,
    value: Option<&Value>,
    context: &ValidationContext,
    errors: &mut FieldErrors,
) {
    let items: &[Value] = match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    };

    let min = if field.is_required() {
        entry.min_entries.max(1)
    } else {
        entry.min_entries
    };
    if items.len() < min {
        let message = if min == 1 {
            format!("At least one {} entry is required", field.title)
        } else {
            format!("{} requires at least {min} entries", field.title)
        };
        errors.insert(&field.name, message);
        return;
    }

    let records: Vec<Record> = items
        .iter()
        .map(|item| match item {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Record::new(),
        })
        .collect();

    let title_of = |name: &str| entry.title_of(name);
    for (index, record) in records.iter().enumerate() {
        for sub_field in &entry.fields {
            if let Some(message) = check_field(sub_field, record, &title_of, context) {
                errors.insert(entry_slot(&field.name, index, &sub_field.name), message);
            }
        }
    }

    if let Some(key) = &entry.key_field {
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            let text = field_text(record, key);
            let normalized = text.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized, index).is_some() {
                errors.insert(
                    &field.name,
                    format!(
                        "Duplicate {} '{}' in {}",
                        entry.title_of(key),
                        text.trim(),
                        field.title
                    ),
                );
                errors.insert(
                    entry_slot(&field.name, index, key),
                    format!("{} is already included", entry.title_of(key)),
                );
            }
        }
    }

    if let Some(sequence) = &entry.sequence_field {
        let mut seen: Vec<f64> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let Some(number) = record.get(sequence).and_then(value_as_f64) else {
                continue;
            };
            if seen.contains(&number) {
                errors.insert(
                    &field.name,
                    format!(
                        "Duplicate {} {} in {}",
                        entry.title_of(sequence),
                        field_text(record, sequence).trim(),
                        field.title
                    ),
                );
                errors.insert(
                    entry_slot(&field.name, index, sequence),
                    format!("{} is already used", entry.title_of(sequence)),
                );
            } else {
                seen.push(number);
            }
        }
    }
}
