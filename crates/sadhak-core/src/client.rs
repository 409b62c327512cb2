use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Ways a `/generate` exchange can fail. None of these reach the user;
/// the dispatcher collapses them into one fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Setup(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response body has no `response` field")]
    MissingResponse,
}

/// Something that turns a prompt into a reply
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError>;
}

/// HTTP client for `POST {base_url}/generate`
#[derive(Clone)]
pub struct GenerateClient {
    client: Client,
    url: String,
}

impl GenerateClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            url: generate_url(base_url),
        }
    }

    /// Like [`GenerateClient::new`], but every request is abandoned after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Setup)?;

        Ok(Self {
            client,
            url: generate_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        debug!(url = %self.url, chars = prompt.chars().count(), "sending prompt");

        let response = self
            .client
            .post(&self.url)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ClientError::Transport {
            url: self.url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(ClientError::Status { status, body });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(ClientError::Decode)?;
        let reply = parsed.response.ok_or(ClientError::MissingResponse)?;

        debug!(status = %status, chars = reply.chars().count(), "received reply");
        Ok(reply)
    }
}

#[async_trait]
impl Generator for GenerateClient {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        GenerateClient::generate(self, prompt).await
    }
}

fn generate_url(base_url: &str) -> String {
    format!("{}/generate", base_url.trim_end_matches('/'))
}
