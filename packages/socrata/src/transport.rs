//! `reqwest`-backed [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::{HttpResponse, HttpTransport, TransportError};

/// Sends requests with a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be initialized
    /// (e.g., the TLS backend fails to load).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    /// Only 2xx bodies are read; other responses come back with an empty
    /// body so the status alone decides the outcome.
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        let body = if status.is_success() {
            response.text().await?
        } else {
            log::debug!("Skipping body of HTTP {status} response from {url}");
            String::new()
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
