use serde_json::Value;

use crate::domain::Record;

/// A single input event against the form.
#[derive(Debug, Clone)]
pub enum FormCommand {
    SetField { field: String, value: Value },
    ClearField { field: String },
    PushEntry { field: String, entry: Record },
    RemoveEntry { field: String, index: usize },
    MoveEntry { field: String, index: usize, delta: i32 },
}

impl FormCommand {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FormCommand::SetField {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FormCommand::SetField { field, .. }
            | FormCommand::ClearField { field }
            | FormCommand::PushEntry { field, .. }
            | FormCommand::RemoveEntry { field, .. }
            | FormCommand::MoveEntry { field, .. } => field,
        }
    }
}
