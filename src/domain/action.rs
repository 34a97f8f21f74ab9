use std::fmt;

use serde::{Deserialize, Serialize};

/// The CRUD-style mode a screen is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Add,
    Edit,
    Delete,
    Search,
    Copy,
}

/// What `save` does to the record collection for a given action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Append,
    Replace,
    Remove,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Add,
        Action::Edit,
        Action::Delete,
        Action::Search,
        Action::Copy,
    ];

    /// Actions other than Add work on an existing record.
    pub fn needs_selection(self) -> bool {
        !matches!(self, Action::Add)
    }

    /// Every field is locked for these actions.
    pub fn locks_form(self) -> bool {
        matches!(self, Action::Search | Action::Delete)
    }

    pub fn store_op(self) -> Option<StoreOp> {
        match self {
            Action::Add | Action::Copy => Some(StoreOp::Append),
            Action::Edit => Some(StoreOp::Replace),
            Action::Delete => Some(StoreOp::Remove),
            Action::Search => None,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Search => "view",
            Action::Copy => "copy",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Action::Add | Action::Copy => "added",
            Action::Edit => "updated",
            Action::Delete => "deleted",
            Action::Search => "viewed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Add => "Add",
            Action::Edit => "Edit",
            Action::Delete => "Delete",
            Action::Search => "Search",
            Action::Copy => "Copy",
        };
        f.write_str(label)
    }
}
