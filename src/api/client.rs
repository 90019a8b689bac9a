use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use super::messages::ProcessFileResponse;
use crate::config::ProcessingConfig;
use crate::error::SessionError;
use crate::upload::UploadFile;

/// Outbound side of the external transcription/summarization service
///
/// Implementations send exactly one request per call and never retry.
#[async_trait]
pub trait ProcessingClient: Send + Sync {
    /// Upload `file` and return the decoded (still unvalidated) response body
    async fn process_file(&self, file: UploadFile) -> Result<ProcessFileResponse, SessionError>;

    /// Base location relative media locators are resolved against
    fn base_url(&self) -> &str;
}

pub struct HttpProcessingClient {
    client: reqwest::Client,
    base_url: String,
    endpoint_url: String,
}

impl HttpProcessingClient {
    pub fn new(config: &ProcessingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let endpoint_url = config.endpoint_url();
        info!("Processing service endpoint: {}", endpoint_url);

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            endpoint_url,
        })
    }
}

#[async_trait]
impl ProcessingClient for HttpProcessingClient {
    async fn process_file(&self, file: UploadFile) -> Result<ProcessFileResponse, SessionError> {
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        info!("Uploading {} ({} bytes) to {}", file.name, size, self.endpoint_url);

        let resp = self
            .client
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!("Processing service error body: {}", body);
            return Err(SessionError::Transport(format!(
                "HTTP error! status: {}",
                status
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        serde_json::from_slice::<ProcessFileResponse>(&body)
            .map_err(|e| SessionError::InvalidResponse(format!("malformed body: {}", e)))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
