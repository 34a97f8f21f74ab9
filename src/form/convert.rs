use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::domain::{EntrySchema, FieldKind, FieldSchema, Record, ScreenSchema, value_to_text};

use super::error::{FieldCoercionError, FieldErrors, entry_slot};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Turn raw form input into the typed record that gets stored. Fields that
/// fail to convert keep their raw value and are reported in the errors.
pub fn coerce_record(schema: &ScreenSchema, values: &Record) -> (Record, FieldErrors) {
    let mut record = Record::with_capacity(values.len());
    let mut errors = FieldErrors::new();
    for (name, value) in values {
        let Some(field) = schema.field(name) else {
            record.insert(name.clone(), value.clone());
            continue;
        };
        match &field.kind {
            FieldKind::Entries(entry) => {
                let items = coerce_entries(field, entry, value, &mut errors);
                record.insert(name.clone(), items);
            }
            _ => match coerce_value(field, value) {
                Ok(coerced) => {
                    record.insert(name.clone(), coerced);
                }
                Err(err) => {
                    errors.insert(err.field, err.message);
                    record.insert(name.clone(), value.clone());
                }
            },
        }
    }
    (record, errors)
}

fn coerce_entries(
    field: &FieldSchema,
    entry: &EntrySchema,
    value: &Value,
    errors: &mut FieldErrors,
) -> Value {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Value::Array(Vec::new()),
        other => {
            errors.insert(&field.name, format!("{} must be a list", field.title));
            return other.clone();
        }
    };
    let mut coerced = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::Object(map) = item else {
            errors.insert(
                &field.name,
                format!("{} entry {} is malformed", field.title, index + 1),
            );
            coerced.push(item.clone());
            continue;
        };
        let mut out = serde_json::Map::new();
        for (sub_name, sub_value) in map {
            let converted = match entry.fields.iter().find(|sub| &sub.name == sub_name) {
                Some(sub_field) => match coerce_value(sub_field, sub_value) {
                    Ok(value) => value,
                    Err(err) => {
                        errors.insert(entry_slot(&field.name, index, sub_name), err.message);
                        sub_value.clone()
                    }
                },
                None => sub_value.clone(),
            };
            out.insert(sub_name.clone(), converted);
        }
        coerced.push(Value::Object(out));
    }
    Value::Array(coerced)
}

pub fn coerce_value(field: &FieldSchema, value: &Value) -> Result<Value, FieldCoercionError> {
    let fail = |message: String| FieldCoercionError {
        field: field.name.clone(),
        message,
    };
    match &field.kind {
        FieldKind::Text => Ok(match value {
            Value::Null => Value::String(String::new()),
            Value::String(text) => Value::String(text.trim().to_string()),
            other => Value::String(value_to_text(other)),
        }),
        FieldKind::Integer => match value {
            Value::Null => Ok(Value::Null),
            Value::Number(number) if number.is_i64() || number.is_u64() => Ok(value.clone()),
            Value::Number(number) => number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && fits_i64(*float))
                .map(|float| Value::from(float as i64))
                .ok_or_else(|| fail(format!("{} must be a whole number", field.title))),
            Value::String(text) if text.trim().is_empty() => Ok(Value::Null),
            Value::String(text) => text
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| fail(format!("{} must be a whole number", field.title))),
            _ => Err(fail(format!("{} must be a whole number", field.title))),
        },
        FieldKind::Number => match value {
            Value::Null | Value::Number(_) => Ok(value.clone()),
            Value::String(text) if text.trim().is_empty() => Ok(Value::Null),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| fail(format!("{} must be a number", field.title))),
            _ => Err(fail(format!("{} must be a number", field.title))),
        },
        FieldKind::Boolean => match value {
            Value::Null => Ok(Value::Bool(false)),
            Value::Bool(_) => Ok(value.clone()),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" | "" => Ok(Value::Bool(false)),
                _ => Err(fail(format!("{} must be yes or no", field.title))),
            },
            _ => Err(fail(format!("{} must be yes or no", field.title))),
        },
        FieldKind::Date => {
            let text = value_to_text(value);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Value::String(String::new()));
            }
            parse_date(trimmed)
                .map(|date| Value::String(date.format(DATE_FORMAT).to_string()))
                .ok_or_else(|| fail(format!("{} must be a date (YYYY-MM-DD)", field.title)))
        }
        FieldKind::Entries(_) => Ok(value.clone()),
    }
}

/// `i64::MIN` is exactly -2^63; `i64::MAX as f64` rounds up to 2^63.
fn fits_i64(float: f64) -> bool {
    float >= i64::MIN as f64 && float < i64::MAX as f64
}
