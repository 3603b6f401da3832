use super::client::HttpEndpoint;
use super::PortraitService;
use crate::error::Endpoint;
use crate::models::PortraitRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Both shapes the image-generation service has answered with.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortraitPayload {
    Single(String),
    Batch(Vec<String>),
}

pub struct PortraitClient {
    http: HttpEndpoint,
}

impl PortraitClient {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(base_url, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        base_url: String,
        timeout: Option<Duration>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: HttpEndpoint::new_with_client(Endpoint::Portrait, base_url, timeout, client),
        }
    }
}

#[async_trait]
impl PortraitService for PortraitClient {
    async fn generate_portraits(&self, request: &PortraitRequest) -> Result<Vec<String>> {
        tracing::info!(
            "Requesting {} portrait(s) at {} steps",
            request.batch_size.saturating_mul(request.sample_count),
            request.steps
        );
        let body = self.http.post_json_text(request).await?;
        let images = normalize_portraits(&body)?;
        tracing::info!("Image service returned {} portrait(s)", images.len());
        Ok(images)
    }
}

/// Convert the response body into the canonical ordered list of payloads.
///
/// A JSON array is kept as-is, a JSON string becomes a one-element list, and
/// a bare (unquoted) body is taken to be a single base64 payload.
pub fn normalize_portraits(body: &str) -> Result<Vec<String>> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::remote(Endpoint::Portrait, "empty response body"));
    }

    match serde_json::from_str::<PortraitPayload>(body) {
        Ok(PortraitPayload::Single(image)) => Ok(vec![image]),
        Ok(PortraitPayload::Batch(images)) => Ok(images),
        Err(e) if body.starts_with(['[', '{', '"']) => {
            tracing::error!("Failed to parse image response: {}", e);
            Err(Error::remote(
                Endpoint::Portrait,
                format!("unrecognized image payload: {}", e),
            ))
        }
        Err(_) => Ok(vec![body.to_string()]),
    }
}
