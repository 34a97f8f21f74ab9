mod format;
mod input;
mod output;
mod table;

pub use format::DocumentFormat;
pub use input::{RECORDS_KEY, load_records_str, load_screen_str, parse_document_str, records_from_value};
pub use output::render_records;
pub use table::{Column, ColumnMap, Table, export_table};
