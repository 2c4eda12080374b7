//! HTTP transport implementation.
//!
//! Push is a `POST` of the JSON push request to the sync endpoint; pull is a
//! `GET` of the same endpoint. Both carry `Authorization: Bearer <token>`.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use async_trait::async_trait;
use ovensync_protocol::{PullResponse, PushRequest};
use std::time::Duration;

/// HTTP-based sync transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport for `endpoint` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns a non-retryable transport error if the client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::transport_fatal(format!("failed to build client: {e}")))?;
        Ok(Self::with_client(endpoint, client))
    }

    /// Creates a transport from the engine configuration.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(config.endpoint.clone(), config.request_timeout)
    }

    /// Creates a transport around an existing client.
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else if err.is_decode() {
        SyncError::Codec(err.to_string())
    } else if err.is_builder() {
        SyncError::transport_fatal(err.to_string())
    } else {
        SyncError::transport_retryable(err.to_string())
    }
}

fn check_status(response: &reqwest::Response) -> SyncResult<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SyncError::Rejected {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn push(&self, auth_token: &str, request: &PushRequest) -> SyncResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(auth_token)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        check_status(&response)
    }

    async fn pull(&self, auth_token: &str) -> SyncResult<PullResponse> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(auth_token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        check_status(&response)?;

        response
            .json::<PullResponse>()
            .await
            .map_err(|e| match map_reqwest_error(e) {
                SyncError::Transport { message, .. } => SyncError::Codec(message),
                other => other,
            })
    }
}
