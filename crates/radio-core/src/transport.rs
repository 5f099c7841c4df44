//! HTTP transport to the message server.
//!
//! The session worker only sees the [`Transport`] trait, so tests can swap
//! in an in-memory server.

use tokio::runtime::{Builder, Runtime};

use crate::error::TransportError;

/// Raw server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send {
    /// POST `fields` as an `application/x-www-form-urlencoded` body
    fn post(&self, path: &str, fields: &[(&str, &str)]) -> Result<TransportResponse, TransportError>;

    /// GET with URL-encoded query parameters
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<TransportResponse, TransportError>;
}

/// reqwest client driven by its own current-thread runtime, so it can be
/// called from a plain worker thread.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
    rt: Runtime,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Runtime(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            rt,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> Result<TransportResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("Failed to read response body: {}", e)))?;
        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn post(&self, path: &str, fields: &[(&str, &str)]) -> Result<TransportResponse, TransportError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        self.rt.block_on(async {
            let response = self
                .client
                .post(&url)
                .form(fields)
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            Self::read(response).await
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<TransportResponse, TransportError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        self.rt.block_on(async {
            let response = self
                .client
                .get(&url)
                .query(query)
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            Self::read(response).await
        })
    }
}
