use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::types::{detail_message, StlcResult, SubmissionPayload};
use crate::utils::error::{ApiError, GENERIC_FAILURE_MESSAGE};

/// Path of the analysis endpoint, relative to the backend base URL
pub const CHAT_PATH: &str = "/chat";

/// Anything able to answer a submission with an STLC result.
///
/// The orchestrator only sees this trait, so tests can swap the HTTP
/// client for a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, payload: SubmissionPayload) -> Result<StlcResult, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    /// No request timeout is set: a dispatched request runs to completion.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("qa-assist-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), CHAT_PATH)
    }

    pub async fn post_chat(&self, payload: &SubmissionPayload) -> Result<StlcResult, ApiError> {
        let url = self.chat_url();
        debug!(%url, "dispatching STLC request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // an unreadable error body counts as one without a detail
            let body = response.text().await.unwrap_or_default();
            let message =
                detail_message(&body).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            warn!(status = status.as_u16(), %message, "STLC request rejected");
            return Err(ApiError::Request {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let parsed: Value = serde_json::from_str(&body).map_err(|e| {
            warn!("STLC response is not valid JSON: {}", e);
            ApiError::MalformedBody(format!("Invalid response from server: {}", e))
        })?;

        let result = StlcResult::from_body(&parsed);
        if result.is_empty() {
            info!("STLC request succeeded with an empty result");
        } else {
            info!("STLC request succeeded");
        }
        Ok(result)
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn analyze(&self, payload: SubmissionPayload) -> Result<StlcResult, ApiError> {
        self.post_chat(&payload).await
    }
}
