use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    app::{ApiResponse, RecordController, RemoteStore, SaveOutcome, ScriptedModal},
    domain::{Action, Record, field_text},
    error::EngineError,
};

use super::{codes_screen, options, record};

/// In-memory stand-in for a REST resource keyed by `id`.
#[derive(Default)]
struct FakeRemote {
    rows: Mutex<Vec<Record>>,
    next_id: Mutex<u64>,
    reject_with: Option<String>,
    offline: bool,
}

impl FakeRemote {
    fn with_rows(rows: Vec<Record>) -> Self {
        let next = rows.len() as u64 + 1;
        Self {
            rows: Mutex::new(rows),
            next_id: Mutex::new(next),
            ..Self::default()
        }
    }

    fn rejecting(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn rows(&self) -> Vec<Record> {
        self.rows.lock().expect("rows").clone()
    }

    fn gate<T>(&self) -> Result<Option<ApiResponse<T>>> {
        if self.offline {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.reject_with.as_ref().map(ApiResponse::failure))
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn list(&self) -> Result<ApiResponse<Vec<Record>>> {
        if let Some(failure) = self.gate()? {
            return Ok(failure);
        }
        Ok(ApiResponse::ok(self.rows()))
    }

    async fn create(&self, record: &Record) -> Result<ApiResponse<Record>> {
        if let Some(failure) = self.gate()? {
            return Ok(failure);
        }
        let mut next = self.next_id.lock().expect("id");
        let mut stored = record.clone();
        stored.insert("id".to_string(), json!(*next));
        *next += 1;
        self.rows.lock().expect("rows").push(stored.clone());
        Ok(ApiResponse::ok(stored))
    }

    async fn update(&self, id: &str, record: &Record) -> Result<ApiResponse<Record>> {
        if let Some(failure) = self.gate()? {
            return Ok(failure);
        }
        let mut rows = self.rows.lock().expect("rows");
        match rows.iter_mut().find(|row| field_text(row, "id") == id) {
            Some(row) => {
                *row = record.clone();
                Ok(ApiResponse::ok(record.clone()))
            }
            None => Ok(ApiResponse::failure(format!("no record {id}"))),
        }
    }

    async fn delete(&self, id: &str) -> Result<ApiResponse<Value>> {
        if let Some(failure) = self.gate()? {
            return Ok(failure);
        }
        let mut rows = self.rows.lock().expect("rows");
        rows.retain(|row| field_text(row, "id") != id);
        Ok(ApiResponse::ok(Value::Null))
    }
}

fn row(id: u64, code: &str, name: &str) -> Record {
    record(&[
        ("id", json!(id)),
        ("code", json!(code)),
        ("name", json!(name)),
        ("created_at", json!("2024-01-01T08:00:00+00:00")),
    ])
}

async fn loaded(remote: &FakeRemote) -> RecordController {
    let mut controller = RecordController::new(codes_screen(), options()).expect("controller");
    controller.refresh_remote(remote).await.expect("refresh");
    controller
}

#[tokio::test]
async fn refresh_replaces_the_local_collection() {
    let remote = FakeRemote::with_rows(vec![row(1, "B2", "Bravo"), row(2, "A1", "Alpha")]);
    let controller = loaded(&remote).await;
    let codes: Vec<String> = controller
        .records()
        .iter()
        .map(|r| field_text(r, "code"))
        .collect();
    assert_eq!(codes, vec!["A1", "B2"]);
}

#[tokio::test]
async fn add_stores_the_server_copy_with_its_id() {
    let remote = FakeRemote::with_rows(vec![row(1, "A1", "Alpha")]);
    let mut controller = loaded(&remote).await;
    controller.set_field("code", "B2");
    controller.set_field("name", "Bravo");

    let outcome = controller.save_remote(&remote).await.expect("save");
    assert!(matches!(outcome, SaveOutcome::Saved { action: Action::Add, .. }));
    assert_eq!(remote.rows().len(), 2);
    assert_eq!(controller.records()[1]["id"], json!(2));
}

#[tokio::test]
async fn edit_addresses_the_record_by_its_remote_id() {
    let remote = FakeRemote::with_rows(vec![row(7, "A1", "Alpha")]);
    let mut controller = loaded(&remote).await;
    let mut modal = ScriptedModal::new().choosing(0);
    controller
        .select_action(Action::Edit, &mut modal)
        .expect("edit");
    controller.set_field("name", "Alpha Prime");

    controller.save_remote(&remote).await.expect("save");
    assert_eq!(remote.rows()[0]["name"], json!("Alpha Prime"));
    assert_eq!(remote.rows()[0]["id"], json!(7));
    assert_eq!(controller.records()[0]["id"], json!(7));
    assert_eq!(controller.records()[0]["name"], json!("Alpha Prime"));
}

#[tokio::test]
async fn delete_removes_remotely_then_locally() {
    let remote = FakeRemote::with_rows(vec![row(1, "A1", "Alpha"), row(2, "B2", "Bravo")]);
    let mut controller = loaded(&remote).await;
    let mut modal = ScriptedModal::new().choosing(0).confirming(true);
    controller
        .select_action(Action::Delete, &mut modal)
        .expect("delete");

    controller.save_remote(&remote).await.expect("save");
    assert_eq!(remote.rows().len(), 1);
    assert_eq!(controller.records().len(), 1);
    assert_eq!(controller.records()[0]["code"], json!("B2"));
}

#[tokio::test]
async fn uniqueness_conflicts_land_on_the_key_field() {
    let remote = FakeRemote::with_rows(Vec::new()).rejecting("Code already exists");
    let mut controller = RecordController::new(codes_screen(), options()).expect("controller");
    controller.set_field("code", "A1");
    controller.set_field("name", "Alpha");

    let SaveOutcome::Invalid(errors) = controller.save_remote(&remote).await.expect("save") else {
        panic!("conflict should come back as a field error");
    };
    assert_eq!(errors.get("code"), Some("Code already exists"));
    assert!(controller.records().is_empty());
}

#[tokio::test]
async fn other_failures_surface_as_errors_without_local_changes() {
    let remote = FakeRemote::with_rows(Vec::new()).rejecting("database is read-only");
    let mut controller = RecordController::new(codes_screen(), options()).expect("controller");
    controller.set_field("code", "A1");
    controller.set_field("name", "Alpha");

    let err = controller.save_remote(&remote).await.expect_err("rejected");
    assert!(matches!(err, EngineError::Remote(ref message) if message == "database is read-only"));
    assert_eq!(controller.status().message(), "save failed: database is read-only");
    assert!(controller.records().is_empty());
    assert_eq!(controller.form().text("code"), "A1", "input is kept for a retry");
}

#[tokio::test]
async fn transport_errors_are_reported() {
    let remote = FakeRemote::default().offline();
    let mut controller = RecordController::new(codes_screen(), options()).expect("controller");
    let err = controller.refresh_remote(&remote).await.expect_err("offline");
    assert!(matches!(err, EngineError::Transport(_)));
    assert!(
        controller.status().message().contains("connection refused"),
        "{}",
        controller.status().message()
    );
}

#[derive(Debug, PartialEq, serde::Deserialize)]
struct Ack {
    id: u64,
}

#[test]
fn envelope_fields_may_be_absent_for_any_payload_type() {
    let failed: ApiResponse<Ack> = serde_json::from_value(json!({
        "success": false,
        "message": "Code already exists"
    }))
    .expect("failure envelope");
    assert!(failed.data.is_none());
    assert!(failed.is_conflict());

    let bare: ApiResponse<Ack> =
        serde_json::from_value(json!({ "success": true })).expect("bare envelope");
    assert_eq!(bare.message, None);
    assert_eq!(bare.data, None);

    let full: ApiResponse<Ack> =
        serde_json::from_value(json!({ "success": true, "data": { "id": 7 } }))
            .expect("full envelope");
    assert_eq!(full.data, Some(Ack { id: 7 }));
}
