//! Coalescing, strictly-sequential sync queues
//!
//! Both queues share one shape: events accumulate in an ordered buffer; the
//! first arrival after the buffer was empty opens a fixed idle window; when
//! the window closes, the buffer is snapshotted and cleared, and the snapshot
//! is processed one item at a time with a fixed inter-item delay. Arrivals
//! during the window join the same drain; arrivals during the drain wait for
//! the next cycle.
//!
//! The two queues differ only in failure policy, and deliberately so:
//! - **Add queue**: any batch-fatal failure drops the remainder of the
//!   snapshot (nothing is retried or requeued). Unsupported-format rejection
//!   is the one non-fatal case and is skipped over.
//! - **Delete queue**: every item is attempted regardless of earlier
//!   failures.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use shuttersync_core::domain::UploadError;

// ============================================================================
// Tasks
// ============================================================================

/// A buffered request to upload one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    /// Path of the file to upload
    pub source_path: PathBuf,
    /// Whether this add was produced by a rename (semantic note only; a
    /// rename is processed exactly like a brand-new upload)
    pub is_rename: bool,
}

/// A buffered request to propagate one local removal to the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTask {
    /// Path of the removed file
    pub path: PathBuf,
}

// ============================================================================
// Handler seams
// ============================================================================

/// Consumer seam for the add queue's drain driver
#[async_trait::async_trait]
pub trait AddHandler: Send + Sync {
    /// Processes one upload task end to end
    async fn handle_add(&self, task: &UploadTask) -> Result<(), UploadError>;
}

/// Consumer seam for the delete queue's drain driver
#[async_trait::async_trait]
pub trait DeleteHandler: Send + Sync {
    /// Processes one delete task end to end
    async fn handle_delete(&self, task: &DeleteTask) -> Result<(), UploadError>;
}

// ============================================================================
// Timing configuration
// ============================================================================

/// Timing knobs shared by both queues
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Idle window between the first buffered event and the drain
    pub drain_idle: Duration,
    /// Delay between consecutive items within one drain
    pub action_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            drain_idle: Duration::from_millis(500),
            action_delay: Duration::from_millis(1000),
        }
    }
}

// ============================================================================
// Buffering
// ============================================================================

/// Collects one drain snapshot from the channel
///
/// Waits for the first item (returning `None` once the channel is closed and
/// empty), then keeps buffering until the idle window elapses. The window is
/// opened once per cycle; later arrivals do not extend it.
async fn collect_snapshot<T>(rx: &mut mpsc::Receiver<T>, idle: Duration) -> Option<Vec<T>> {
    let first = rx.recv().await?;
    let mut buffer = vec![first];

    let window = sleep(idle);
    tokio::pin!(window);

    loop {
        tokio::select! {
            _ = &mut window => break,
            item = rx.recv() => match item {
                Some(item) => buffer.push(item),
                // Sender gone: drain what we have.
                None => break,
            },
        }
    }

    Some(buffer)
}

// ============================================================================
// Add queue
// ============================================================================

/// Runs the add queue until its channel closes
///
/// Within one snapshot, items are processed in strict FIFO order with
/// `action_delay` between them. The first batch-fatal failure drops the
/// remaining items of that snapshot; they are not requeued.
pub async fn run_add_queue(
    mut rx: mpsc::Receiver<UploadTask>,
    handler: std::sync::Arc<dyn AddHandler>,
    config: QueueConfig,
) {
    info!("Add queue started");

    while let Some(batch) = collect_snapshot(&mut rx, config.drain_idle).await {
        debug!(count = batch.len(), "Draining add queue");

        for (index, task) in batch.iter().enumerate() {
            match handler.handle_add(task).await {
                Ok(()) => {}
                Err(err) if err.halts_batch() => {
                    let dropped = batch.len() - index - 1;
                    warn!(
                        path = %task.source_path.display(),
                        error = %err,
                        dropped,
                        "Upload failed, dropping remainder of drain cycle"
                    );
                    break;
                }
                Err(err) => {
                    // Rejection by file type: report and keep going.
                    debug!(path = %task.source_path.display(), error = %err, "Skipping unsupported file");
                }
            }
            sleep(config.action_delay).await;
        }
    }

    info!("Add queue stopped");
}

// ============================================================================
// Delete queue
// ============================================================================

/// Runs the delete queue until its channel closes
///
/// Mirrors the add queue's snapshot-then-sequential shape, but failures never
/// halt the cycle: each deletion is attempted independently.
pub async fn run_delete_queue(
    mut rx: mpsc::Receiver<DeleteTask>,
    handler: std::sync::Arc<dyn DeleteHandler>,
    config: QueueConfig,
) {
    info!("Delete queue started");

    while let Some(batch) = collect_snapshot(&mut rx, config.drain_idle).await {
        debug!(count = batch.len(), "Draining delete queue");

        for task in &batch {
            if let Err(err) = handler.handle_delete(task).await {
                warn!(path = %task.path.display(), error = %err, "Remote delete failed, continuing");
            }
            sleep(config.action_delay).await;
        }
    }

    info!("Delete queue stopped");
}
