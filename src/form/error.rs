use std::fmt;

use indexmap::IndexMap;

/// Error slot for problems that belong to no single field.
pub const FORM_SLOT: &str = "_form";

/// Field name to inline error message. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: IndexMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless the field already has an error.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) -> bool {
        let field = field.into();
        if self.entries.contains_key(&field) {
            return false;
        }
        self.entries.insert(field, message.into());
        true
    }

    /// Records `message`, replacing any earlier error for the field.
    pub fn set(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.entries.shift_remove(field)
    }

    /// Drops every error for `field`, including nested entry errors.
    pub fn remove_field(&mut self, field: &str) {
        let nested = format!("{field}[");
        self.entries
            .retain(|key, _| key != field && !key.starts_with(&nested));
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.entries {
            self.insert(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.entries {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Key under which an error for one sub-field of a composite entry is stored.
pub fn entry_slot(field: &str, index: usize, sub_field: &str) -> String {
    format!("{field}[{index}].{sub_field}")
}

#[derive(Debug, Clone)]
pub struct FieldCoercionError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldCoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldCoercionError {}
