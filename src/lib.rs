#![deny(rust_2018_idioms)]

pub mod app;
pub mod domain;
pub mod error;
pub mod form;
pub mod io;
pub mod screens;
pub mod store;
pub mod validate;

pub use app::{
    ActionOutcome, ApiResponse, EngineOptions, RecordController, RemoteStore, SaveOutcome,
    SelectionModal, StatusLine,
};
#[cfg(feature = "http")]
pub use app::HttpRemoteStore;
pub use domain::{Action, Record, RecordId, ScreenSchema};
pub use error::EngineError;
pub use form::{FieldErrors, FormCommand};

pub mod prelude {
    pub use super::app::{ScriptedModal, SelectionResult};
    pub use super::domain::{
        EntrySchema, FieldSchema, KeyCompare, Pattern, SortKey, UniqueKey,
    };
    pub use super::{
        Action, ActionOutcome, EngineError, EngineOptions, FieldErrors, FormCommand, Record,
        RecordController, RecordId, SaveOutcome, ScreenSchema, SelectionModal,
    };
}

#[cfg(test)]
mod tests;
