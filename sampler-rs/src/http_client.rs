use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::time::Duration;

use crate::errors::SamplerError;

/// JSON over HTTP client for the phyphox REST API.
#[derive(Clone)]
pub(crate) struct HttpClient {
    client: ReqwestClient,
    base_url: String,
}

impl HttpClient {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self, SamplerError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SamplerError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `path` (command plus query, e.g. `/get?accX=..`) and decodes the JSON answer.
    /// # Errors
    /// - FetchData if phyphox is unreachable, answers non-2xx or the body is not JSON
    pub(crate) async fn fetch_json(&self, path: &str) -> Result<Value, SamplerError> {
        let url = format!("{}{}", self.base_url, path);
        log::trace!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SamplerError::FetchData(format!("{}: {}", path, e)))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| SamplerError::FetchData(format!("{}: invalid JSON: {}", path, e)))
    }
}
