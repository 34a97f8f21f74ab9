//! Ready-made back-office screens.
//!
//! Each function returns a fresh [`ScreenSchema`]; regex compilation is the
//! only thing that can fail.

use anyhow::{Context, Result};
use serde_json::json;

use crate::domain::{
    EntrySchema, FieldRule, FieldSchema, Pattern, ScreenSchema, SortKey, UniqueKey,
};

/// Property codes: a short alphanumeric code with a display name.
pub fn property_code() -> Result<ScreenSchema> {
    Ok(ScreenSchema::new("property-code", "Property Code")
        .with_field(
            FieldSchema::text("property_code")
                .titled("Property Code")
                .required()
                .max_length(10)
                .pattern(Pattern::alphanumeric().context("property code pattern")?),
        )
        .with_field(
            FieldSchema::text("property_name")
                .titled("Property Name")
                .required()
                .max_length(60),
        )
        .with_field(FieldSchema::text("created_at").titled("Created At").provenance())
        .with_unique(UniqueKey::new("property_code"))
        .with_sort(SortKey::by(["property_code"])))
}

/// Reason codes. The display sequence only has to be unique among reasons
/// of the same operation type.
pub fn reason_code() -> Result<ScreenSchema> {
    Ok(ScreenSchema::new("reason-code", "Reason Code")
        .with_field(
            FieldSchema::text("reason_code")
                .titled("Reason Code")
                .required()
                .max_length(10)
                .pattern(Pattern::alphanumeric().context("reason code pattern")?),
        )
        .with_field(
            FieldSchema::text("description")
                .titled("Description")
                .required()
                .max_length(80),
        )
        .with_field(
            FieldSchema::text("operation_type")
                .titled("Operation Type")
                .required(),
        )
        .with_field(
            FieldSchema::integer("display_sequence")
                .titled("Display Sequence")
                .required()
                .range(1.0, 999.0),
        )
        .with_unique(UniqueKey::new("reason_code"))
        .with_unique(UniqueKey::numeric("display_sequence").scoped_by("operation_type"))
        .with_sort(SortKey::by(["operation_type", "display_sequence"])))
}

/// Tax structures with the ordered list of taxes they include.
pub fn tax_structure() -> Result<ScreenSchema> {
    let included = EntrySchema::new(vec![
        FieldSchema::text("tax_code").titled("Tax Code").required(),
        FieldSchema::integer("sequence")
            .titled("Sequence")
            .required()
            .range(1.0, 99.0),
        FieldSchema::text("calculation_method")
            .titled("Calculation Method")
            .with_default(json!("percentage")),
    ])
    .with_key("tax_code")
    .with_sequence("sequence")
    .with_min_entries(1);

    Ok(ScreenSchema::new("tax-structure", "Tax Structure")
        .with_field(
            FieldSchema::text("structure_code")
                .titled("Structure Code")
                .required()
                .max_length(10)
                .pattern(Pattern::alphanumeric().context("structure code pattern")?),
        )
        .with_field(
            FieldSchema::text("structure_name")
                .titled("Structure Name")
                .required()
                .max_length(60),
        )
        .with_field(
            FieldSchema::date("applicable_from")
                .titled("Applicable From")
                .required()
                .not_past_on_add(),
        )
        .with_field(
            FieldSchema::entries("included_taxes", included)
                .titled("Included Taxes")
                .required(),
        )
        .with_unique(UniqueKey::new("structure_code"))
        .with_sort(SortKey::by(["structure_code"])))
}

/// Back-office users.
pub fn user_setup() -> Result<ScreenSchema> {
    Ok(ScreenSchema::new("user-setup", "User")
        .with_field(
            FieldSchema::text("login_name")
                .titled("Login Name")
                .required()
                .min_length(3)
                .max_length(20)
                .pattern(Pattern::alphanumeric().context("login name pattern")?),
        )
        .with_field(
            FieldSchema::text("first_name")
                .titled("First Name")
                .required()
                .pattern(Pattern::alphabetic().context("first name pattern")?),
        )
        .with_field(
            FieldSchema::text("last_name")
                .titled("Last Name")
                .pattern(Pattern::alphabetic().context("last name pattern")?),
        )
        .with_field(
            FieldSchema::text("email")
                .titled("Email")
                .pattern(Pattern::email().context("email pattern")?),
        )
        .with_field(
            FieldSchema::text("pin")
                .titled("PIN")
                .required()
                .pattern(Pattern::digits(4, 6).context("pin pattern")?),
        )
        .with_field(FieldSchema::boolean("active").titled("Active").with_default(json!(true)))
        .with_unique(UniqueKey::new("login_name"))
        .with_sort(SortKey::by(["login_name"])))
}

/// Menu items with their button font size and validity window.
pub fn item_master() -> Result<ScreenSchema> {
    Ok(ScreenSchema::new("item-master", "Item")
        .with_field(
            FieldSchema::text("item_code")
                .titled("Item Code")
                .required()
                .max_length(12)
                .pattern(Pattern::alphanumeric().context("item code pattern")?),
        )
        .with_field(
            FieldSchema::text("item_name")
                .titled("Item Name")
                .required()
                .max_length(60),
        )
        .with_field(
            FieldSchema::number("price")
                .titled("Price")
                .required()
                .rule(FieldRule::Range {
                    min: Some(0.0),
                    max: None,
                }),
        )
        .with_field(
            FieldSchema::integer("font_size")
                .titled("Font Size")
                .range(6.0, 72.0),
        )
        .with_field(
            FieldSchema::date("valid_from")
                .titled("Valid From")
                .required()
                .before("valid_to"),
        )
        .with_field(FieldSchema::date("valid_to").titled("Valid To").required())
        .with_field(FieldSchema::text("created_at").titled("Created At").provenance())
        .with_unique(UniqueKey::new("item_code"))
        .with_sort(SortKey::by(["item_code"])))
}

/// Every built-in screen.
pub fn all() -> Result<Vec<ScreenSchema>> {
    Ok(vec![
        property_code()?,
        reason_code()?,
        tax_structure()?,
        user_setup()?,
        item_master()?,
    ])
}

/// Look up a built-in screen by its id.
pub fn by_id(id: &str) -> Result<Option<ScreenSchema>> {
    Ok(all()?.into_iter().find(|screen| screen.id == id))
}
