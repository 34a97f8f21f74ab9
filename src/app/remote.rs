use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Record;

/// Envelope every persistence endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// A failed response whose message reports a uniqueness clash.
    pub fn is_conflict(&self) -> bool {
        !self.success && self.message.as_deref().is_some_and(indicates_conflict)
    }
}

pub fn indicates_conflict(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("unique") || lowered.contains("exists")
}

/// Request/response persistence for screens backed by a remote resource:
/// `GET /resource`, `POST /resource`, `PUT /resource/:id`,
/// `DELETE /resource/:id`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self) -> Result<ApiResponse<Vec<Record>>>;

    async fn create(&self, record: &Record) -> Result<ApiResponse<Record>>;

    async fn update(&self, id: &str, record: &Record) -> Result<ApiResponse<Record>>;

    async fn delete(&self, id: &str) -> Result<ApiResponse<Value>>;
}
