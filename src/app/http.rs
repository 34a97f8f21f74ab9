use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::Record;

use super::remote::{ApiResponse, RemoteStore};

/// [`RemoteStore`] over HTTP+JSON.
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    resource: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, resource)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resource: resource.into().trim_matches('/').to_string(),
        }
    }

    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    pub fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self) -> Result<ApiResponse<Vec<Record>>> {
        let url = self.collection_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        decode(response).await
    }

    async fn create(&self, record: &Record) -> Result<ApiResponse<Record>> {
        let url = self.collection_url();
        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        decode(response).await
    }

    async fn update(&self, id: &str, record: &Record) -> Result<ApiResponse<Record>> {
        let url = self.item_url(id);
        let response = self
            .client
            .put(&url)
            .json(record)
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;
        decode(response).await
    }

    async fn delete(&self, id: &str) -> Result<ApiResponse<Value>> {
        let url = self.item_url(id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {url} failed"))?;
        decode(response).await
    }
}

/// Error statuses usually still carry the envelope; fall back to the HTTP
/// status when they don't.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("failed to read response body")?;
    match serde_json::from_str::<ApiResponse<T>>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Ok(ApiResponse::failure(format!(
            "server answered {status}"
        ))),
        Err(err) => Err(err).context("response is not a valid API envelope"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_resource_urls_without_double_slashes() {
        let store = HttpRemoteStore::new("http://localhost:3000/api/", "/property-codes/");
        assert_eq!(
            store.collection_url(),
            "http://localhost:3000/api/property-codes"
        );
        assert_eq!(
            store.item_url("42"),
            "http://localhost:3000/api/property-codes/42"
        );
    }
}
