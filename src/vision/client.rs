//! HTTP client for the vision proxy

use serde::{Deserialize, Serialize};

use super::{VisionApi, VisionReply};
use crate::camera::Frame;
use crate::{Error, Result};

/// Request body for the openai-proxy endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    prompt: &'a str,
    image_base64: String,
}

/// Response body from the openai-proxy endpoint
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyResponse {
    text: Option<String>,
    debug_description: Option<String>,
    error: Option<String>,
}

/// Vision client that talks to the local proxy
pub struct VisionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl VisionClient {
    /// Create a client for a proxy base URL (e.g. "http://localhost:5174")
    #[must_use]
    pub fn new(proxy_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/openai-proxy", proxy_url.trim_end_matches('/')),
        }
    }
}

#[async_trait::async_trait]
impl VisionApi for VisionClient {
    async fn analyze(&self, frame: &Frame, prompt: &str) -> Result<VisionReply> {
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            prompt_len = prompt.len(),
            "querying vision model"
        );

        let request = ProxyRequest {
            prompt,
            image_base64: frame.to_base64(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Vision(format!("proxy request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Vision(format!("proxy error {status}: {body}")));
        }

        let result: ProxyResponse = response
            .json()
            .await
            .map_err(|e| Error::Vision(format!("malformed proxy response: {e}")))?;

        if let Some(error) = result.error {
            return Err(Error::Vision(format!("proxy reported: {error}")));
        }

        let text = result
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Vision("empty response from vision model".to_string()))?;

        tracing::debug!(response = %text, "vision model replied");

        Ok(VisionReply {
            text,
            debug_description: result.debug_description,
        })
    }
}
