//! Storage backed by a remote HTTP document server (e.g. a Solid pod).

use super::{Storage, StorageResponse, SPARQL_UPDATE};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// HTTP client issuing plain document requests, optionally authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpStorage {
    client: Client,
    auth_token: Option<String>,
}

impl HttpStorage {
    pub fn new(timeout_secs: u64, auth_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, auth_token })
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, method: &str, url: &str, request: RequestBuilder) -> Result<StorageResponse> {
        let response = self
            .add_auth_header(request)
            .send()
            .await
            .map_err(|e| transport(method, url, e))?;
        into_storage_response(method, url, response).await
    }
}

fn transport(method: &str, url: &str, err: reqwest::Error) -> Error {
    Error::Transport {
        step: method.to_string(),
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

async fn into_storage_response(method: &str, url: &str, response: Response) -> Result<StorageResponse> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| transport(method, url, e))?;
    tracing::debug!(method, url, status, "storage request");
    Ok(StorageResponse { status, body })
}

#[async_trait]
impl Storage for HttpStorage {
    async fn get(&self, url: &str) -> Result<StorageResponse> {
        let request = self.client.get(url).header("Accept", super::TURTLE);
        self.send("GET", url, request).await
    }

    async fn put(&self, url: &str, body: &str, content_type: &str) -> Result<StorageResponse> {
        let request = self
            .client
            .put(url)
            .header("Content-Type", content_type)
            .body(body.to_string());
        self.send("PUT", url, request).await
    }

    async fn patch(&self, url: &str, update: &str) -> Result<StorageResponse> {
        let request = self
            .client
            .patch(url)
            .header("Content-Type", SPARQL_UPDATE)
            .body(update.to_string());
        self.send("PATCH", url, request).await
    }

    async fn post(&self, url: &str, body: &str, content_type: &str) -> Result<StorageResponse> {
        let request = self
            .client
            .post(url)
            .header("Content-Type", content_type)
            .body(body.to_string());
        self.send("POST", url, request).await
    }

    async fn delete(&self, url: &str) -> Result<StorageResponse> {
        let request = self.client.delete(url);
        self.send("DELETE", url, request).await
    }
}
