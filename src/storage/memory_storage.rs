//! In-process document store used for dry runs and tests.

use super::{Storage, StorageResponse};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Patch,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub status: u16,
}

/// Documents keyed by URL, plus a log of every request in arrival order.
///
/// `patch` understands `INSERT DATA { ... }` only and appends the inserted triples to the
/// target document. Failures can be queued with [`MemoryStorage::fail_next`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<BTreeMap<String, String>>,
    requests: RwLock<Vec<RecordedRequest>>,
    failures: RwLock<VecDeque<(Method, u16)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `method` request with `status` and leave the documents untouched.
    pub async fn fail_next(&self, method: Method, status: u16) {
        self.failures.write().await.push_back((method, status));
    }

    pub async fn document(&self, url: &str) -> Option<String> {
        self.documents.read().await.get(url).cloned()
    }

    /// All stored URLs, sorted.
    pub async fn urls(&self) -> Vec<String> {
        self.documents.read().await.keys().cloned().collect()
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    async fn injected_failure(&self, method: Method) -> Option<u16> {
        let mut failures = self.failures.write().await;
        let pos = failures.iter().position(|(m, _)| *m == method)?;
        failures.remove(pos).map(|(_, status)| status)
    }

    async fn record(&self, method: Method, url: &str, response: StorageResponse) -> Result<StorageResponse> {
        tracing::debug!(%method, url, status = response.status, "memory storage request");
        self.requests.write().await.push(RecordedRequest {
            method,
            url: url.to_string(),
            status: response.status,
        });
        Ok(response)
    }

    async fn handle(&self, method: Method, url: &str, body: &str) -> StorageResponse {
        if let Some(status) = self.injected_failure(method).await {
            return StorageResponse::new(status, format!("injected {} failure", method));
        }

        let mut documents = self.documents.write().await;
        match method {
            Method::Get => match documents.get(url) {
                Some(doc) => StorageResponse::new(200, doc.clone()),
                None => StorageResponse::new(404, "not found"),
            },
            Method::Put => {
                let status = if documents.contains_key(url) { 205 } else { 201 };
                documents.insert(url.to_string(), body.to_string());
                StorageResponse::new(status, "")
            }
            Method::Patch => match insert_data_body(body) {
                Some(inserted) => {
                    let doc = documents.entry(url.to_string()).or_default();
                    if !doc.is_empty() && !doc.ends_with('\n') {
                        doc.push('\n');
                    }
                    doc.push_str(inserted.trim());
                    doc.push('\n');
                    StorageResponse::new(205, "")
                }
                None => StorageResponse::new(400, "only INSERT DATA updates are supported"),
            },
            Method::Post => {
                if !url.ends_with('/') {
                    return StorageResponse::new(405, "POST target is not a container");
                }
                let location = format!("{}{}", url, uuid::Uuid::new_v4());
                documents.insert(location.clone(), body.to_string());
                StorageResponse::new(201, location)
            }
            Method::Delete => match documents.remove(url) {
                Some(_) => StorageResponse::new(205, ""),
                None => StorageResponse::new(404, "not found"),
            },
        }
    }
}

/// Content between the braces of `INSERT DATA { ... }`.
fn insert_data_body(update: &str) -> Option<&str> {
    let rest = update.trim().strip_prefix("INSERT DATA")?.trim_start();
    let inner = rest.strip_prefix('{')?.trim_end().strip_suffix('}')?;
    Some(inner)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, url: &str) -> Result<StorageResponse> {
        let response = self.handle(Method::Get, url, "").await;
        self.record(Method::Get, url, response).await
    }

    async fn put(&self, url: &str, body: &str, _content_type: &str) -> Result<StorageResponse> {
        let response = self.handle(Method::Put, url, body).await;
        self.record(Method::Put, url, response).await
    }

    async fn patch(&self, url: &str, update: &str) -> Result<StorageResponse> {
        let response = self.handle(Method::Patch, url, update).await;
        self.record(Method::Patch, url, response).await
    }

    async fn post(&self, url: &str, body: &str, _content_type: &str) -> Result<StorageResponse> {
        let response = self.handle(Method::Post, url, body).await;
        self.record(Method::Post, url, response).await
    }

    async fn delete(&self, url: &str) -> Result<StorageResponse> {
        let response = self.handle(Method::Delete, url, "").await;
        self.record(Method::Delete, url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.put("http://x/a", "doc", "text/turtle").await.unwrap().status, 201);
        assert_eq!(storage.get("http://x/a").await.unwrap().body, "doc");
        assert_eq!(storage.delete("http://x/a").await.unwrap().status, 205);
        assert_eq!(storage.get("http://x/a").await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_patch_appends_inserted_triples() {
        let storage = MemoryStorage::new();
        storage.put("http://x/.meta", "<a> <b> <c> .", "text/turtle").await.unwrap();
        let response = storage
            .patch("http://x/.meta", "INSERT DATA {\n<a> <b> <d> .\n}")
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(
            storage.document("http://x/.meta").await.unwrap(),
            "<a> <b> <c> .\n<a> <b> <d> .\n"
        );
    }

    #[tokio::test]
    async fn test_unsupported_update_is_rejected() {
        let storage = MemoryStorage::new();
        let response = storage.patch("http://x/.meta", "DELETE WHERE { ?s ?p ?o }").await.unwrap();
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn test_injected_failure_consumed_once() {
        let storage = MemoryStorage::new();
        storage.fail_next(Method::Put, 503).await;

        assert_eq!(storage.put("http://x/a", "doc", "text/turtle").await.unwrap().status, 503);
        assert!(storage.document("http://x/a").await.is_none());
        assert_eq!(storage.put("http://x/a", "doc", "text/turtle").await.unwrap().status, 201);
        assert_eq!(storage.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_post_creates_child() {
        let storage = MemoryStorage::new();
        let response = storage.post("http://x/c/", "doc", "text/turtle").await.unwrap();

        assert_eq!(response.status, 201);
        assert!(response.body.starts_with("http://x/c/"));
        assert_eq!(storage.document(&response.body).await.unwrap(), "doc");
    }
}
