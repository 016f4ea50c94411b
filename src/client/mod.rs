//! Typed HTTP client for the catalog API.
//!
//! [`ApiClient`] owns the connection pool and cookie store; the
//! per-surface clients wrap a clone of it, so a session established through
//! [`AccountClient`] is sent by every other client built from the same base.

pub mod account;
pub mod catalog;
pub mod cms;

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::models::UploadResponse;

pub use account::AccountClient;
pub use catalog::CatalogClient;
pub use cms::{CmsClient, Resource};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("reelhouse/0.1")
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send::<(), T>(Method::DELETE, path, None).await
    }

    /// Sends an image to `/api/uploads` and returns the stored relative path.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self.http.post(self.url("/api/uploads")).multipart(form).send().await?;
        decode(resp).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T> {
        let mut req = self.http.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }

        decode(req.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        return Err(ClientError::Status { status, message: error_message(&bytes, status) });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pulls the `error` field out of an API error body, falling back to the
/// status reason.
fn error_message(body: &[u8], status: StatusCode) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let client = ApiClient::with_client(reqwest::Client::new(), "http://localhost:5000/");
        assert_eq!(client.url("/landing/movies/popular"), "http://localhost:5000/landing/movies/popular");
        assert_eq!(client.url("api/actors"), "http://localhost:5000/api/actors");
    }

    #[test]
    fn error_message_prefers_body() {
        let body = br#"{"success":false,"error":"Country already exists"}"#;
        assert_eq!(error_message(body, StatusCode::CONFLICT), "Country already exists");
        assert_eq!(error_message(b"<html>", StatusCode::BAD_GATEWAY), "Bad Gateway");
    }
}
