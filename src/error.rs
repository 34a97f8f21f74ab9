use thiserror::Error;

use crate::domain::{Action, RecordId};

/// Failures of the record workflow. Field-level problems are not errors;
/// they come back as `FieldErrors` from `save`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("select a record to {} first", .0.verb())]
    NoSelection(Action),
    #[error("record index {index} is out of range ({len} records)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("record {0} no longer exists")]
    StaleRecord(RecordId),
    #[error("{0} mode is read-only")]
    ReadOnly(Action),
    #[error("save failed: {0}")]
    Remote(String),
    #[error("remote store unavailable: {0:#}")]
    Transport(#[from] anyhow::Error),
}
