mod checks;
mod entries;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use jsonschema::{Validator, validator_for};
use serde_json::{Map, Value};

use crate::{
    domain::{Action, FieldKind, Record, ScreenSchema, is_blank},
    form::{FORM_SLOT, FieldErrors, coerce_record, entry_slot},
};

/// What the rules need to know besides the form itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub action: Action,
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn new(action: Action, today: NaiveDate) -> Self {
        Self { action, today }
    }
}

/// Maps a complete form snapshot to its field-level errors.
pub struct FieldValidator {
    schema: Arc<ScreenSchema>,
    structural: Option<Validator>,
}

impl FieldValidator {
    pub fn new(schema: Arc<ScreenSchema>) -> Result<Self> {
        let structural = schema
            .document
            .as_ref()
            .map(|document| validator_for(document).context("failed to compile JSON schema"))
            .transpose()?;
        Ok(Self { schema, structural })
    }

    pub fn schema(&self) -> &ScreenSchema {
        &self.schema
    }

    /// Runs every rule over every field. Fields without an entry are valid.
    pub fn validate(&self, values: &Record, context: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let title_of = |name: &str| self.schema.title_of(name);

        for field in &self.schema.fields {
            match &field.kind {
                FieldKind::Entries(entry) => {
                    entries::check_entries(
                        field,
                        entry,
                        values.get(&field.name),
                        context,
                        &mut errors,
                    );
                }
                _ => {
                    if let Some(message) = checks::check_field(field, values, &title_of, context) {
                        errors.insert(&field.name, message);
                    }
                }
            }
        }

        let (record, conversion) = coerce_record(&self.schema, values);
        errors.merge(conversion);

        if let Some(validator) = &self.structural {
            self.apply_structural(validator, &record, &mut errors);
        }
        errors
    }

    /// Errors that concern `field` alone, including its entry slots.
    pub fn validate_field(
        &self,
        values: &Record,
        field: &str,
        context: &ValidationContext,
    ) -> FieldErrors {
        let nested = format!("{field}[");
        let mut scoped = FieldErrors::new();
        for (name, message) in self.validate(values, context).iter() {
            if name == field || name.starts_with(&nested) {
                scoped.insert(name, message);
            }
        }
        scoped
    }

    fn apply_structural(&self, validator: &Validator, record: &Record, errors: &mut FieldErrors) {
        let instance = structural_instance(record);
        for error in validator.iter_errors(&instance) {
            let pointer = error.instance_path.to_string();
            let slot = slot_for_pointer(&pointer);
            let message = error.to_string();
            match slot {
                Some(slot) => {
                    let base = slot.split('[').next().unwrap_or(&slot).to_string();
                    if !errors.contains(&base) && !errors.contains(&slot) {
                        errors.insert(slot, message);
                    }
                }
                None => {
                    if errors.is_empty() {
                        errors.insert(FORM_SLOT, message);
                    }
                }
            }
        }
    }
}

/// Blank inputs mean "not provided", so they are left out of the document
/// the structural check sees.
fn structural_instance(record: &Record) -> Value {
    let map: Map<String, Value> = record
        .iter()
        .filter(|(_, value)| !is_blank(Some(*value)) || value.is_array())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    Value::Object(map)
}

fn slot_for_pointer(pointer: &str) -> Option<String> {
    let mut segments = pointer.trim_start_matches('/').split('/');
    let field = segments.next().filter(|segment| !segment.is_empty())?;
    match (segments.next(), segments.next()) {
        (Some(index), Some(sub_field)) => match index.parse::<usize>() {
            Ok(index) => Some(entry_slot(field, index, sub_field)),
            Err(_) => Some(field.to_string()),
        },
        _ => Some(field.to_string()),
    }
}
