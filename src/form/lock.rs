use crate::domain::{Action, FieldSchema, ScreenSchema};

/// Whether `field` rejects input for the given action.
///
/// Search and Delete lock the whole form. Provenance fields are never
/// editable. Key fields can be typed while adding or copying, and in Edit
/// only until a record has been selected.
pub fn is_read_only(field: &FieldSchema, action: Action, has_selection: bool) -> bool {
    if action.locks_form() || field.provenance {
        return true;
    }
    if !field.key {
        return false;
    }
    match action {
        Action::Add | Action::Copy => false,
        Action::Edit => has_selection,
        Action::Delete | Action::Search => true,
    }
}

/// Same as [`is_read_only`], looked up by field name. Unknown fields are locked.
pub fn is_field_read_only(
    schema: &ScreenSchema,
    field: &str,
    action: Action,
    has_selection: bool,
) -> bool {
    schema
        .field(field)
        .map(|field| is_read_only(field, action, has_selection))
        .unwrap_or(true)
}
