mod action;
mod parser;
mod record;
mod schema;

pub use action::{Action, StoreOp};
pub use parser::parse_screen_schema;
pub use record::{
    Record, RecordId, field_text, is_blank, record_from_value, record_to_value, value_as_f64,
    value_to_text,
};
pub use schema::{
    EntrySchema, FieldKind, FieldRule, FieldSchema, KeyCompare, KeyMatcher, Pattern,
    ScreenSchema, SortKey, UniqueKey, prettify_label,
};

impl ScreenSchema {
    pub fn from_json_schema(document: &serde_json::Value) -> anyhow::Result<Self> {
        parse_screen_schema(document)
    }
}
