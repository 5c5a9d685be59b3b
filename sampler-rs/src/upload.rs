use std::time::Duration;

use reqwest::{Client as ReqwestClient, Url};

use crate::config::UploadConfig;
use crate::errors::UploadError;
use crate::models::UploadPayload;

/// Response of an accepted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// Posts collected batches as JSON. A single attempt is made per call.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: ReqwestClient,
}

impl Uploader {
    pub fn new(timeout: Duration) -> Result<Self, UploadError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self, UploadError> {
        Self::new(config.timeout())
    }

    /// Sends `payload` to `endpoint` with `Content-Type: application/json`.
    /// # Errors
    /// - Request if `endpoint` is not a valid url or the request cannot be built
    /// - Unreachable if no response is received (connection refused, timeout...)
    /// - Rejected if the server answers with a non-2xx status
    pub async fn upload(
        &self,
        endpoint: &str,
        payload: &UploadPayload,
    ) -> Result<UploadReceipt, UploadError> {
        let url = Url::parse(endpoint)
            .map_err(|e| UploadError::Request(format!("invalid endpoint {}: {}", endpoint, e)))?;

        log::info!("Uploading {} samples to {}", payload.len(), url);
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = read_body(response).await;

        if status.is_success() {
            log::debug!("Upload response body: {}", body);
            Ok(UploadReceipt {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
                headers,
            })
        }
    }
}

async fn read_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("Could not read upload response body (status {}): {}", status, e);
            String::new()
        }
    }
}

fn classify_send_error(e: reqwest::Error) -> UploadError {
    if e.is_builder() {
        UploadError::Request(e.to_string())
    } else if e.is_connect() || e.is_timeout() || e.is_request() {
        UploadError::Unreachable(e.to_string())
    } else {
        UploadError::Request(e.to_string())
    }
}
