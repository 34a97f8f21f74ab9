mod actions;
mod convert;
mod dirty;
mod error;
mod lock;
mod reducers;
mod state;

pub use actions::FormCommand;
pub use convert::{DATE_FORMAT, coerce_record, coerce_value, parse_date};
pub use dirty::DirtyTracker;
pub use error::{FORM_SLOT, FieldCoercionError, FieldErrors, entry_slot};
pub use lock::{is_field_read_only, is_read_only};
pub use reducers::apply_command;
pub use state::FormState;
