mod arena;
mod duplicates;
mod order;

pub use arena::{RecordStore, StoredRecord};
pub use duplicates::{Conflict, DuplicateChecker, find_conflict, is_duplicate};
pub use order::compare_records;
