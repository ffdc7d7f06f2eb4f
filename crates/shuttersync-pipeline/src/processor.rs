//! Per-file upload and delete procedures
//!
//! [`FileProcessor`] is the single writer of the upload ledger and the only
//! place network calls for photos happen. For each add it validates the file
//! type, requires a configured session, computes the content digest, consults
//! the ledger, optionally composites a frame, uploads, and registers the
//! result — in that order, each step a hard precondition for the next. For
//! each delete it propagates the removal to the remote within an explicit
//! timeout budget.
//!
//! Every outcome is reported through the notifier and activity-log ports;
//! failures are returned to the queue driver as values, never raised.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use shuttersync_core::domain::{media, Identity, UploadError};
use shuttersync_core::ports::remote::RemoteError;
use shuttersync_core::ports::{
    IActivityLog, INotifier, IRemoteSyncClient, ISessionProvider, UploadReceipt,
};

use crate::compositor::FrameCompositor;
use crate::hasher;
use crate::ledger::UploadLedger;
use crate::queue::{AddHandler, DeleteHandler, DeleteTask, UploadTask};

/// Orchestrates the per-file sync procedures against the injected ports
pub struct FileProcessor {
    remote: Arc<dyn IRemoteSyncClient>,
    session: Arc<dyn ISessionProvider>,
    notifier: Arc<dyn INotifier>,
    activity: Arc<dyn IActivityLog>,
    ledger: UploadLedger,
    compositor: FrameCompositor,
    delete_timeout: Duration,
}

/// Human-readable file name for notifications and logs
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Maps transport-level outcomes onto the per-file failure taxonomy
fn map_remote_error(err: RemoteError) -> UploadError {
    match err {
        RemoteError::Network(message) => UploadError::NetworkFailure(message),
        RemoteError::Rejected { status, message } => {
            UploadError::RemoteRejected { status, message }
        }
        RemoteError::Timeout => UploadError::TimeoutFailure,
    }
}

impl FileProcessor {
    /// Creates a processor over the given ports and ledger
    pub fn new(
        remote: Arc<dyn IRemoteSyncClient>,
        session: Arc<dyn ISessionProvider>,
        notifier: Arc<dyn INotifier>,
        activity: Arc<dyn IActivityLog>,
        ledger: UploadLedger,
        delete_timeout: Duration,
    ) -> Self {
        let compositor = FrameCompositor::new(remote.clone());
        Self {
            remote,
            session,
            notifier,
            activity,
            ledger,
            compositor,
            delete_timeout,
        }
    }

    /// Requires a token and a complete identity, or refuses the operation
    fn configured_session(&self) -> Result<(String, Identity), UploadError> {
        let token = self.session.token().ok_or(UploadError::NotConfigured)?;
        let identity = self
            .session
            .identity()
            .filter(Identity::is_complete)
            .ok_or(UploadError::NotConfigured)?;
        Ok((token, identity))
    }

    /// Uploads one file end to end (steps are hard preconditions in order)
    async fn upload_file(&self, task: &UploadTask) -> Result<UploadReceipt, UploadError> {
        let source = task.source_path.as_path();

        // 1. File-type gate: no network call for unsupported formats.
        if !media::is_supported(source) {
            let ext = source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| "<none>".to_string());
            return Err(UploadError::UnsupportedFormat(ext));
        }

        // 2. Session gate.
        let (token, identity) = self.configured_session()?;

        // 3-4. Content digest, then dedup against the ledger. Only an exact
        // digest + path repeat is skipped.
        let digest = hasher::content_digest(source).await?;
        if self.ledger.is_duplicate(&digest, source) {
            return Err(UploadError::DuplicateUpload(source.to_path_buf()));
        }

        // 5. A rename is a semantic note only; processing continues as a
        // brand-new upload of content at a new path.
        if task.is_rename {
            self.activity.log_event(
                "file_renamed",
                &format!("treating renamed file as new upload: {}", source.display()),
            );
        }

        // 6. Optional frame overlay. When applied, every later step operates
        // on the derivative.
        let upload_path = match self.compositor.apply(source, &identity).await? {
            Some(derived) => derived,
            None => source.to_path_buf(),
        };

        // 7. Upload with identity metadata attached.
        let bytes = tokio::fs::read(&upload_path).await?;
        let receipt = self
            .remote
            .upload(bytes, &display_name(&upload_path), &identity, &token)
            .await
            .map_err(map_remote_error)?;

        // 8. Confirmed success: register the digest of the bytes actually
        // uploaded, then (for composited uploads) drop the local original.
        let uploaded_digest = if upload_path == source {
            digest
        } else {
            hasher::content_digest(&upload_path).await?
        };
        self.ledger
            .register(&uploaded_digest, &upload_path, &receipt.remote_location)?;

        if upload_path != source {
            if let Err(err) = tokio::fs::remove_file(source).await {
                // The upload itself succeeded; losing the cleanup is only
                // worth a warning.
                warn!(path = %source.display(), error = %err, "Could not remove original after composited upload");
            }
        }

        Ok(receipt)
    }

    /// Propagates one local removal to the remote
    async fn delete_remote(&self, task: &DeleteTask) -> Result<(), UploadError> {
        let (token, identity) = self.configured_session()?;

        self.remote
            .delete(
                &identity.event_id,
                &display_name(&task.path),
                &identity,
                &token,
                self.delete_timeout,
            )
            .await
            .map_err(map_remote_error)
    }
}

#[async_trait::async_trait]
impl AddHandler for FileProcessor {
    async fn handle_add(&self, task: &UploadTask) -> Result<(), UploadError> {
        let name = display_name(&task.source_path);

        match self.upload_file(task).await {
            Ok(receipt) => {
                info!(path = %task.source_path.display(), location = %receipt.remote_location, "Upload succeeded");
                self.notifier
                    .notify("Upload Succeeded", &format!("{name} was uploaded"))
                    .await;
                self.activity
                    .log_event("upload_succeeded", &receipt.remote_location);
                Ok(())
            }
            Err(err) => {
                warn!(path = %task.source_path.display(), error = %err, "Upload failed");
                self.notifier
                    .notify("Upload Failed", &format!("{name}: {err}"))
                    .await;
                self.activity.log_event("upload_failed", &err.to_string());
                Err(err)
            }
        }
    }
}

#[async_trait::async_trait]
impl DeleteHandler for FileProcessor {
    async fn handle_delete(&self, task: &DeleteTask) -> Result<(), UploadError> {
        let name = display_name(&task.path);

        match self.delete_remote(task).await {
            Ok(()) => {
                info!(path = %task.path.display(), "Remote delete succeeded");
                self.notifier
                    .notify("File Removed", &format!("{name} was removed from the cloud"))
                    .await;
                self.activity
                    .log_event("remote_delete_succeeded", &task.path.display().to_string());
                Ok(())
            }
            Err(err) => {
                warn!(path = %task.path.display(), error = %err, "Remote delete failed");
                self.notifier
                    .notify("Removal Failed", &format!("{name}: {err}"))
                    .await;
                self.activity
                    .log_event("remote_delete_failed", &err.to_string());
                Err(err)
            }
        }
    }
}
