//! Upload and delete failure taxonomy
//!
//! Every per-file failure in the pipeline is classified by [`UploadError`].
//! Failures are caught at the per-file boundary, reported through the
//! notifier/activity-log ports, and returned to the queue driver; they never
//! propagate as uncaught faults that would stop the process.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while processing a single file
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file extension is not in the supported media set
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// No session token, or the identity (user, event, company) is incomplete
    #[error("Missing session token or configured identity")]
    NotConfigured,

    /// This exact content was already uploaded from this exact path
    #[error("File already uploaded: {0}")]
    DuplicateUpload(PathBuf),

    /// The request never reached the server (DNS, connect, reset)
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The server responded with a non-success status
    #[error("Remote rejected request with status {status}: {message}")]
    RemoteRejected {
        /// HTTP status code returned by the server
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// The frame asset referenced by the active configuration could not be fetched
    #[error("Frame asset fetch failed: {0}")]
    AssetFetchFailure(String),

    /// The source or frame image could not be decoded, overlaid, or re-encoded
    #[error("Frame compositing failed: {0}")]
    CompositeFailed(String),

    /// A deletion request exceeded its timeout budget
    #[error("Remote deletion timed out")]
    TimeoutFailure,

    /// Local I/O failure (read, hash, or derived-file write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether this failure halts the remainder of an add-queue drain snapshot.
    ///
    /// Rejection by file type is the one non-fatal case: an unsupported file
    /// is reported and skipped while the rest of the batch continues. Every
    /// other failure drops the remaining items of the in-flight drain cycle.
    pub fn halts_batch(&self) -> bool {
        !matches!(self, UploadError::UnsupportedFormat(_))
    }
}
