mod controller;
#[cfg(feature = "http")]
mod http;
mod modal;
mod options;
mod remote;
mod status;

pub use controller::{ActionOutcome, RecordController, SaveOutcome};
#[cfg(feature = "http")]
pub use http::HttpRemoteStore;
pub use modal::{ScriptedModal, SelectionModal, SelectionRequest, SelectionResult};
pub use options::EngineOptions;
pub use remote::{ApiResponse, RemoteStore, indicates_conflict};
pub use status::{NoticeKind, READY_STATUS, StatusLine};
