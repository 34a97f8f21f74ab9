use std::sync::Arc;

use serde_json::Value;

use crate::domain::{FieldKind, Record, ScreenSchema, field_text};

use super::{convert::coerce_record, error::FieldErrors};

/// The values currently shown in a screen's form plus their inline errors.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<ScreenSchema>,
    values: Record,
    errors: FieldErrors,
}

impl FormState {
    pub fn new(schema: Arc<ScreenSchema>) -> Self {
        let values = schema.blank_record();
        Self {
            schema,
            values,
            errors: FieldErrors::new(),
        }
    }

    pub fn schema(&self) -> &ScreenSchema {
        &self.schema
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> String {
        field_text(&self.values, field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.set(field, message);
    }

    pub fn clear_error(&mut self, field: &str) {
        self.errors.remove_field(field);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Back to the blank Add form.
    pub fn reset(&mut self) {
        self.values = self.schema.blank_record();
        self.errors.clear();
    }

    /// Populate the form from a stored record. Fields the record lacks fall
    /// back to their defaults; fields outside the schema are ignored.
    pub fn seed_from_record(&mut self, record: &Record) {
        self.values = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let value = record
                    .get(&field.name)
                    .cloned()
                    .unwrap_or_else(|| field.default_value());
                (field.name.clone(), value)
            })
            .collect();
        self.errors.clear();
    }

    /// Blank the given fields, e.g. the unique keys of a copied record.
    pub fn blank_fields<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) {
        for name in fields {
            if let Some(field) = self.schema.field(name) {
                self.values.insert(name.to_string(), field.default_value());
            }
        }
    }

    /// Returns whether the value changed. Unknown fields are rejected.
    pub fn set_value(&mut self, field: &str, value: Value) -> bool {
        match self.values.get_mut(field) {
            Some(current) if *current != value => {
                *current = value;
                true
            }
            Some(_) => false,
            None => false,
        }
    }

    /// The entry list of a list field; `None` for any other field.
    pub(crate) fn entries_mut(&mut self, field: &str) -> Option<&mut Vec<Value>> {
        if !matches!(
            self.schema.field(field).map(|field| &field.kind),
            Some(FieldKind::Entries(_))
        ) {
            return None;
        }
        let slot = self.values.get_mut(field)?;
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut()
    }

    /// The typed record `save` would store, or the conversion errors.
    pub fn try_build_record(&self) -> Result<Record, FieldErrors> {
        let (record, errors) = coerce_record(&self.schema, &self.values);
        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}
