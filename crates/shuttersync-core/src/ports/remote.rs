//! Remote sync client port (driven/secondary port)
//!
//! Defines the interface for the remote storage service: uploading a file
//! with its identity metadata, deleting a remote object by name, and fetching
//! frame assets for the compositor. The HTTP implementation lives in the
//! `shuttersync-api` crate.
//!
//! ## Design Notes
//!
//! - Errors are typed ([`RemoteError`]) rather than `anyhow` because the
//!   pipeline distinguishes "never reached the server", "server said no",
//!   and "timed out" when classifying per-file failures.
//! - Deletions take an explicit timeout budget; uploads do not.

use std::time::Duration;

use thiserror::Error;

use crate::domain::Identity;

/// Transport-level outcome classification for remote calls
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a server response
    #[error("Network failure: {0}")]
    Network(String),

    /// The server responded with a non-success status
    #[error("Remote returned status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// The request exceeded its timeout budget
    #[error("Request timed out")]
    Timeout,
}

/// Confirmation of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Location of the uploaded object as reported by the server
    pub remote_location: String,
}

/// Port trait for remote storage operations
#[async_trait::async_trait]
pub trait IRemoteSyncClient: Send + Sync {
    /// Uploads a file's bytes under the given name, attaching identity metadata
    ///
    /// Success is defined as the server confirming creation; anything else is
    /// a [`RemoteError::Rejected`].
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        identity: &Identity,
        token: &str,
    ) -> Result<UploadReceipt, RemoteError>;

    /// Deletes a remote object by event and file name, within `timeout`
    async fn delete(
        &self,
        event_id: &str,
        file_name: &str,
        identity: &Identity,
        token: &str,
        timeout: Duration,
    ) -> Result<(), RemoteError>;

    /// Fetches the raw bytes of a frame asset by its reference
    async fn fetch_asset(&self, asset_ref: &str) -> Result<Vec<u8>, RemoteError>;
}
