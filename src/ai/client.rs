use crate::error::Endpoint;
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;

/// Thin reqwest wrapper shared by the description and portrait clients.
///
/// Bodies are returned as raw text so each client can normalize its own
/// response shape.
pub struct HttpEndpoint {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    endpoint: Endpoint,
    timeout: Option<Duration>,
}

impl HttpEndpoint {
    pub fn new(endpoint: Endpoint, base_url: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(endpoint, base_url, timeout, Client::new())
    }

    pub fn new_with_client(
        endpoint: Endpoint,
        base_url: String,
        timeout: Option<Duration>,
        client: Client,
    ) -> Self {
        Self {
            client,
            base_url,
            endpoint,
            timeout,
        }
    }

    /// Base URL with `pairs` appended as a percent-encoded (RFC 3986) query.
    pub fn url_with_query(&self, pairs: &[(&str, &str)]) -> String {
        let query = pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            return self.base_url.clone();
        }

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.base_url, separator, query)
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!("Sending GET to {}: {}", self.endpoint, url);
        self.send(self.client.get(url)).await
    }

    pub async fn post_json_text<Req: Serialize>(&self, request: &Req) -> Result<String> {
        tracing::debug!("Sending POST to {}: {}", self.endpoint, self.base_url);
        self.send(self.client.post(&self.base_url).json(request))
            .await
    }

    async fn send(&self, mut builder: RequestBuilder) -> Result<String> {
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", self.endpoint, e);
            Error::remote(self.endpoint, e.to_string())
        })?;

        self.read_body(response).await
    }

    async fn read_body(&self, response: Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read body from {}: {}", self.endpoint, e);
            Error::remote(self.endpoint, e.to_string())
        })?;

        if !status.is_success() {
            tracing::error!("{} error (status {}): {}", self.endpoint, status, body);
            return Err(Error::remote(self.endpoint, format!("status {}", status)));
        }

        Ok(body)
    }
}
