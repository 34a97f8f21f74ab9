use serde_json::json;

use crate::{
    domain::{FieldSchema, KeyCompare, Record, ScreenSchema, UniqueKey, field_text},
    store::{DuplicateChecker, find_conflict, is_duplicate},
};

use super::{codes_screen, record};

fn reason_screen() -> ScreenSchema {
    ScreenSchema::new("reasons", "Reason")
        .with_field(FieldSchema::text("reason_code").titled("Reason Code"))
        .with_field(FieldSchema::text("operation_type").titled("Operation Type"))
        .with_field(FieldSchema::integer("display_sequence").titled("Display Sequence"))
        .with_unique(UniqueKey::new("reason_code"))
        .with_unique(UniqueKey::numeric("display_sequence").scoped_by("operation_type"))
}

fn reason(code: &str, operation: &str, sequence: i64) -> Record {
    record(&[
        ("reason_code", json!(code)),
        ("operation_type", json!(operation)),
        ("display_sequence", json!(sequence)),
    ])
}

#[test]
fn keys_compare_ignoring_case_and_whitespace() {
    let schema = codes_screen();
    let existing = vec![record(&[("code", json!("ab1"))])];
    let candidate = record(&[("code", json!(" AB1 "))]);

    let errors = DuplicateChecker::new(&schema).check(&candidate, &existing, None);
    assert_eq!(errors.get("code"), Some("Code 'AB1' already exists"));
}

#[test]
fn the_record_being_edited_is_exempt() {
    let schema = codes_screen();
    let existing = vec![
        record(&[("code", json!("A"))]),
        record(&[("code", json!("B"))]),
    ];
    let candidate = record(&[("code", json!("B"))]);

    assert!(!is_duplicate(&candidate, &existing, Some(1), &schema.unique_keys));
    assert!(is_duplicate(&candidate, &existing, Some(0), &schema.unique_keys));
}

#[test]
fn blank_keys_never_collide() {
    let schema = codes_screen();
    let existing = vec![record(&[("code", json!(""))])];
    let candidate = record(&[("code", json!(""))]);
    assert!(!is_duplicate(&candidate, &existing, None, &schema.unique_keys));
}

#[test]
fn sequence_is_unique_only_within_its_operation_type() {
    let schema = reason_screen();
    let existing = vec![reason("A1", "sale", 1)];

    let other_type = reason("A2", "refund", 1);
    assert!(
        DuplicateChecker::new(&schema)
            .check(&other_type, &existing, None)
            .is_empty(),
        "same sequence under another operation type is allowed"
    );

    let same_type = reason("A2", "sale", 1);
    let errors = DuplicateChecker::new(&schema).check(&same_type, &existing, None);
    assert_eq!(
        errors.get("display_sequence"),
        Some("Display Sequence '1' already exists for Operation Type 'sale'")
    );
    assert!(!errors.contains("reason_code"));
}

#[test]
fn numeric_keys_compare_as_numbers() {
    let schema = reason_screen();
    let existing = vec![reason("A1", "sale", 7)];
    let candidate = record(&[
        ("reason_code", json!("A2")),
        ("operation_type", json!("sale")),
        ("display_sequence", json!("7.0")),
    ]);
    let conflict = find_conflict(&candidate, &existing, None, &schema.unique_keys)
        .expect("sequence 7.0 repeats 7");
    assert_eq!(conflict.key.field, "display_sequence");
    assert_eq!(conflict.index, 0);
}

#[test]
fn exact_comparison_is_case_sensitive() {
    let keys = vec![UniqueKey::new("code").compared(KeyCompare::Exact)];
    let existing = vec![record(&[("code", json!("abc"))])];
    assert!(!is_duplicate(&record(&[("code", json!("ABC"))]), &existing, None, &keys));
    assert!(is_duplicate(&record(&[("code", json!("abc"))]), &existing, None, &keys));
}

#[test]
fn custom_matcher_replaces_field_comparison() {
    let keys = vec![UniqueKey::new("email").with_matcher(|candidate, existing| {
        let domain = |r: &Record| {
            field_text(r, "email")
                .rsplit('@')
                .next()
                .unwrap_or_default()
                .to_lowercase()
        };
        domain(candidate) == domain(existing)
    })];
    let existing = vec![record(&[("email", json!("ann@example.com"))])];
    let candidate = record(&[("email", json!("bob@EXAMPLE.com"))]);
    assert!(is_duplicate(&candidate, &existing, None, &keys));
}
