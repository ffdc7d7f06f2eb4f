//! HTTP client for the event-photo service
//!
//! Wraps `reqwest::Client` with the wire contract of the remote API:
//! bearer-token auth plus an `X-Permission-Id` header on every identity-bound
//! call, multipart upload to `/image/upload`, deletion via
//! `/image/delete/{eventId}/{fileName}`, and plain GETs for frame assets.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shuttersync_api::client::HttpSyncClient;
//!
//! let client = HttpSyncClient::new("https://api.samambaialabs.com.br");
//! ```

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use shuttersync_core::domain::Identity;
use shuttersync_core::ports::remote::{IRemoteSyncClient, RemoteError, UploadReceipt};

/// Status the server returns for a confirmed-successful upload
const UPLOAD_CREATED: StatusCode = StatusCode::CREATED;

// ============================================================================
// API response types
// ============================================================================

/// Body of a successful upload response
#[derive(Debug, Deserialize)]
struct UploadResponse {
    /// Where the uploaded object was stored
    location: String,
}

// ============================================================================
// HttpSyncClient
// ============================================================================

/// HTTP adapter implementing the remote sync client port
///
/// Holds a connection-pooling `reqwest::Client` and the service base URL.
/// Construct with [`HttpSyncClient::new`]; tests point the base URL at a
/// mock server.
pub struct HttpSyncClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests (no trailing slash)
    base_url: String,
}

impl HttpSyncClient {
    /// Creates a new client for the given service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Classifies a transport error as timeout or network failure
    fn map_transport_error(err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Network(err.to_string())
        }
    }

    /// Reads a non-success response into a [`RemoteError::Rejected`]
    async fn rejection(response: reqwest::Response) -> RemoteError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        RemoteError::Rejected { status, message }
    }
}

#[async_trait::async_trait]
impl IRemoteSyncClient for HttpSyncClient {
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        identity: &Identity,
        token: &str,
    ) -> Result<UploadReceipt, RemoteError> {
        debug!(file_name, bytes = data.len(), "Uploading file");

        let form = Form::new()
            .part("images", Part::bytes(data).file_name(file_name.to_string()))
            .text("eventId", identity.event_id.clone())
            .text("userId", identity.user_id.clone())
            .text("companyId", identity.company_id.clone());

        let response = self
            .client
            .post(format!("{}/image/upload", self.base_url))
            .bearer_auth(token)
            .header("X-Permission-Id", &identity.permission_id)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if response.status() != UPLOAD_CREATED {
            warn!(status = %response.status(), file_name, "Upload rejected");
            return Err(Self::rejection(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Network(format!("invalid upload response: {e}")))?;

        info!(file_name, location = %body.location, "Upload confirmed");
        Ok(UploadReceipt {
            remote_location: body.location,
        })
    }

    async fn delete(
        &self,
        event_id: &str,
        file_name: &str,
        identity: &Identity,
        token: &str,
        timeout: Duration,
    ) -> Result<(), RemoteError> {
        debug!(event_id, file_name, timeout_ms = timeout.as_millis() as u64, "Deleting remote object");

        let response = self
            .client
            .delete(format!(
                "{}/image/delete/{}/{}",
                self.base_url, event_id, file_name
            ))
            .bearer_auth(token)
            .header("X-Permission-Id", &identity.permission_id)
            .timeout(timeout)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if response.status() != StatusCode::OK {
            warn!(status = %response.status(), file_name, "Remote delete rejected");
            return Err(Self::rejection(response).await);
        }

        info!(event_id, file_name, "Remote delete confirmed");
        Ok(())
    }

    async fn fetch_asset(&self, asset_ref: &str) -> Result<Vec<u8>, RemoteError> {
        debug!(asset_ref, "Fetching frame asset");

        let response = self
            .client
            .get(asset_ref)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(Self::map_transport_error)?;

        debug!(asset_ref, bytes = bytes.len(), "Frame asset fetched");
        Ok(bytes.to_vec())
    }
}
