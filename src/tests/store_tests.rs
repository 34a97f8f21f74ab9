use serde_json::json;

use crate::{
    domain::{Record, SortKey, field_text},
    error::EngineError,
    store::RecordStore,
};

use super::{codes_screen, record};

fn codes(store: &RecordStore) -> Vec<String> {
    store.iter().map(|r| field_text(r, "code")).collect()
}

fn seq(kind: &str, sequence: i64, label: &str) -> Record {
    record(&[
        ("kind", json!(kind)),
        ("sequence", json!(sequence)),
        ("label", json!(label)),
    ])
}

#[test]
fn append_resorts_and_keeps_insertion_order_on_ties() {
    let mut store = RecordStore::new().with_sort(SortKey::by(["kind", "sequence"]));
    store.append(seq("sale", 2, "first"));
    store.append(seq("refund", 5, "second"));
    store.append(seq("sale", 2, "third"));
    store.append(seq("sale", 1, "fourth"));

    let labels: Vec<String> = store.iter().map(|r| field_text(r, "label")).collect();
    assert_eq!(labels, vec!["second", "fourth", "first", "third"]);
}

#[test]
fn unsorted_store_keeps_append_order() {
    let mut store = RecordStore::new();
    store.append(record(&[("code", json!("B"))]));
    store.append(record(&[("code", json!("A"))]));
    assert_eq!(codes(&store), vec!["B", "A"]);
}

#[test]
fn replace_keeps_provenance_of_the_old_record() {
    let schema = codes_screen();
    let mut store = RecordStore::for_screen(&schema);
    let id = store.append(record(&[
        ("code", json!("A1")),
        ("name", json!("Alpha")),
        ("created_at", json!("2024-01-01T00:00:00")),
    ]));

    store
        .replace(
            id,
            record(&[
                ("code", json!("A1")),
                ("name", json!("Alpha Prime")),
                ("created_at", json!("")),
            ]),
        )
        .expect("replace");

    let stored = store.get_by_id(id).expect("record still there");
    assert_eq!(stored["name"], json!("Alpha Prime"));
    assert_eq!(stored["created_at"], json!("2024-01-01T00:00:00"));
}

#[test]
fn removing_the_first_of_three_keeps_the_rest_in_order() {
    let mut store = RecordStore::for_screen(&codes_screen());
    let a = store.append(record(&[("code", json!("A"))]));
    let b = store.append(record(&[("code", json!("B"))]));
    let c = store.append(record(&[("code", json!("C"))]));

    let removed = store.remove_at(0).expect("remove");
    assert_eq!(removed["code"], json!("A"));
    assert_eq!(codes(&store), vec!["B", "C"]);
    assert_eq!(store.position(b), Some(0));
    assert_eq!(store.position(c), Some(1));
    assert_eq!(store.position(a), None);
}

#[test]
fn ids_survive_reordering() {
    let mut store = RecordStore::for_screen(&codes_screen());
    let z = store.append(record(&[("code", json!("Z"))]));
    store.append(record(&[("code", json!("A"))]));
    assert_eq!(store.position(z), Some(1));
    assert_eq!(store.get_by_id(z).map(|r| field_text(r, "code")), Some("Z".into()));
}

#[test]
fn stale_and_out_of_range_targets_are_errors() {
    let mut store = RecordStore::new();
    let id = store.append(record(&[("code", json!("A"))]));
    store.remove(id).expect("first remove");

    assert!(matches!(store.remove(id), Err(EngineError::StaleRecord(stale)) if stale == id));
    assert!(matches!(
        store.replace_at(3, Record::new()),
        Err(EngineError::IndexOutOfRange { index: 3, len: 0 })
    ));
}

#[test]
fn reset_replaces_the_whole_collection() {
    let mut store = RecordStore::for_screen(&codes_screen()).seeded([
        record(&[("code", json!("B"))]),
        record(&[("code", json!("A"))]),
    ]);
    assert_eq!(codes(&store), vec!["A", "B"]);

    store.reset([record(&[("code", json!("Q"))])]);
    assert_eq!(codes(&store), vec!["Q"]);
}

#[test]
fn mixed_numeric_and_text_codes_sort_the_same_for_any_insertion_order() {
    let schema = codes_screen();
    for order in [
        ["10", "9", "1A"],
        ["1A", "9", "10"],
        ["10", "1A", "9"],
        ["9", "10", "1A"],
    ] {
        let mut store = RecordStore::for_screen(&schema);
        for code in order {
            store.append(record(&[("code", json!(code))]));
        }
        assert_eq!(codes(&store), vec!["9", "10", "1A"], "inserted as {order:?}");
    }
}

#[test]
fn non_finite_spellings_sort_as_text() {
    let mut store = RecordStore::for_screen(&codes_screen());
    for code in ["NaN", "inf", "2", "B"] {
        store.append(record(&[("code", json!(code))]));
    }
    assert_eq!(codes(&store), vec!["2", "B", "inf", "NaN"]);
}
