mod duplicate_tests;
mod remote_tests;
mod store_tests;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    app::EngineOptions,
    domain::{FieldSchema, Pattern, Record, ScreenSchema, SortKey, UniqueKey},
};

pub(crate) fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub(crate) fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

pub(crate) fn options() -> EngineOptions {
    EngineOptions::default().with_today(fixed_today())
}

/// Small code/name screen with a provenance column, sorted by code.
pub(crate) fn codes_screen() -> ScreenSchema {
    ScreenSchema::new("codes", "Code")
        .with_field(
            FieldSchema::text("code")
                .titled("Code")
                .required()
                .max_length(5)
                .pattern(Pattern::alphanumeric().expect("pattern")),
        )
        .with_field(FieldSchema::text("name").titled("Name").required())
        .with_field(FieldSchema::text("created_at").provenance())
        .with_unique(UniqueKey::new("code"))
        .with_sort(SortKey::by(["code"]))
}
