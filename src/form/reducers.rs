use serde_json::Value;

use crate::domain::record_to_value;

use super::{actions::FormCommand, state::FormState};

/// Apply an input event. Returns whether any value changed.
pub fn apply_command(state: &mut FormState, command: FormCommand) -> bool {
    match command {
        FormCommand::SetField { field, value } => state.set_value(&field, value),
        FormCommand::ClearField { field } => {
            let Some(default) = state.schema().field(&field).map(|f| f.default_value()) else {
                return false;
            };
            state.set_value(&field, default)
        }
        FormCommand::PushEntry { field, entry } => {
            let Some(entries) = state.entries_mut(&field) else {
                return false;
            };
            entries.push(record_to_value(&entry));
            true
        }
        FormCommand::RemoveEntry { field, index } => {
            let Some(entries) = state.entries_mut(&field) else {
                return false;
            };
            if index >= entries.len() {
                return false;
            }
            entries.remove(index);
            true
        }
        FormCommand::MoveEntry {
            field,
            index,
            delta,
        } => {
            let Some(entries) = state.entries_mut(&field) else {
                return false;
            };
            move_entry(entries, index, delta)
        }
    }
}

fn move_entry(entries: &mut [Value], index: usize, delta: i32) -> bool {
    if entries.len() < 2 || index >= entries.len() {
        return false;
    }
    let len = entries.len() as i64;
    let next = index as i64 + delta as i64;
    if next < 0 || next >= len {
        return false;
    }
    entries.swap(index, next as usize);
    true
}
