//! Document storage the publisher writes to.
//!
//! The publisher only needs a handful of HTTP-like verbs against URLs, so storage is a trait
//! with a remote implementation ([`HttpStorage`]) and an in-process one ([`MemoryStorage`]).

pub mod http_storage;
pub mod memory_storage;

pub use http_storage::HttpStorage;
pub use memory_storage::{MemoryStorage, Method, RecordedRequest};

use crate::error::{Error, Result};
use async_trait::async_trait;

pub const TURTLE: &str = "text/turtle";
pub const SPARQL_UPDATE: &str = "application/sparql-update";

/// Status and body of a storage call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageResponse {
    pub status: u16,
    pub body: String,
}

impl StorageResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Verbs used against the document store.
///
/// Implementations return `Err` only when no response was obtained; a non-2xx answer is a
/// regular [`StorageResponse`] and callers decide through [`ensure_success`].
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, url: &str) -> Result<StorageResponse>;

    async fn put(&self, url: &str, body: &str, content_type: &str) -> Result<StorageResponse>;

    /// Apply a SPARQL update to the document at `url`.
    async fn patch(&self, url: &str, update: &str) -> Result<StorageResponse>;

    async fn post(&self, url: &str, body: &str, content_type: &str) -> Result<StorageResponse>;

    async fn delete(&self, url: &str) -> Result<StorageResponse>;
}

/// Turn a non-2xx response into [`Error::Transport`] tagged with `step`.
pub fn ensure_success(step: &str, url: &str, response: StorageResponse) -> Result<StorageResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::Transport {
            step: step.to_string(),
            url: url.to_string(),
            status: Some(response.status),
            message: if response.body.is_empty() {
                format!("status {}", response.status)
            } else {
                response.body
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_success_passes_2xx() {
        let response = StorageResponse::new(201, "");
        assert_eq!(ensure_success("put", "http://x/", response.clone()).unwrap(), response);
    }

    #[test]
    fn test_ensure_success_maps_failure() {
        let err = ensure_success("patch", "http://x/.meta", StorageResponse::new(409, "conflict"))
            .unwrap_err();

        match err {
            Error::Transport { step, url, status, message } => {
                assert_eq!(step, "patch");
                assert_eq!(url, "http://x/.meta");
                assert_eq!(status, Some(409));
                assert_eq!(message, "conflict");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
