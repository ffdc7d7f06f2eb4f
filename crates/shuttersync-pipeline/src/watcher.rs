//! Folder watching and queue supervision
//!
//! Provides a [`FolderWatcher`] that wraps the `notify` crate to monitor a
//! photo folder recursively, converting raw OS events into typed
//! [`FileEvent`] values, and a [`WatchSupervisor`] that owns the watch
//! lifecycle: it routes events into the add/delete queues and drives the
//! recovery flow when the watched root itself disappears.
//!
//! ## Architecture
//!
//! ```text
//! inotify / kqueue
//!       │
//!       ▼
//!  FolderWatcher  ──→  mpsc::channel  ──→  WatchSupervisor ──→ add/delete queues
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use shuttersync_core::domain::media;
use shuttersync_core::ports::{IActivityLog, IFolderPicker, INotifier};

use crate::queue::{DeleteTask, UploadTask};

// ============================================================================
// FileEvent
// ============================================================================

/// A filesystem change relevant to the sync pipeline
///
/// The internal representation consumed by the supervisor, decoupled from the
/// `notify` crate's raw event types. Events are ephemeral: consumed exactly
/// once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A file appeared in the watched tree
    Added {
        /// Path of the new file
        path: PathBuf,
        /// Whether it arrived via a rename within the tree
        is_rename: bool,
    },
    /// A file disappeared from the watched tree
    Removed(PathBuf),
    /// The watched root itself was deleted or renamed away
    RootRemoved,
}

// ============================================================================
// Event mapping - notify::Event → FileEvent
// ============================================================================

/// Converts a `notify::Event` into pipeline events
///
/// - `Create(File/Any/Other)` -> `Added` (compositor outputs filtered out)
/// - `Remove` of the root -> `RootRemoved`; of a non-root directory ->
///   nothing (only file removals propagate to the remote); of a file ->
///   `Removed`
/// - `Modify(Name(Both))` -> `Removed` for the old path + `Added` (rename)
/// - `Modify(Name(From/To))` -> the matching half of a rename
/// - everything else (data/metadata modifications, access) is ignored
///
/// Derived compositor outputs are dropped at this boundary so they can never
/// re-enter the upload pipeline as fresh adds.
fn map_notify_event(event: &notify::Event, root: &Path) -> Vec<FileEvent> {
    let paths = &event.paths;

    match &event.kind {
        EventKind::Create(kind) => {
            if matches!(kind, CreateKind::Folder) {
                return Vec::new();
            }
            let Some(path) = paths.first() else {
                return Vec::new();
            };
            added_event(path, false).into_iter().collect()
        }

        EventKind::Remove(kind) => {
            let Some(path) = paths.first() else {
                return Vec::new();
            };
            if path == root {
                debug!(path = %path.display(), "Watched root removed");
                vec![FileEvent::RootRemoved]
            } else if matches!(kind, RemoveKind::Folder) {
                // Only the root directory's removal means anything; a
                // subdirectory name was never uploaded.
                debug!(path = %path.display(), "Ignoring non-root directory removal");
                Vec::new()
            } else {
                debug!(path = %path.display(), "Mapped Remove event");
                vec![FileEvent::Removed(path.clone())]
            }
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() >= 2 => {
            let old = &paths[0];
            let new = &paths[1];
            if old == root {
                return vec![FileEvent::RootRemoved];
            }
            debug!(old = %old.display(), new = %new.display(), "Mapped rename event");
            let mut events = vec![FileEvent::Removed(old.clone())];
            events.extend(added_event(new, true));
            events
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            let Some(path) = paths.first() else {
                return Vec::new();
            };
            if path == root {
                vec![FileEvent::RootRemoved]
            } else {
                vec![FileEvent::Removed(path.clone())]
            }
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            let Some(path) = paths.first() else {
                return Vec::new();
            };
            added_event(path, true).into_iter().collect()
        }

        other => {
            debug!(kind = ?other, "Ignoring event kind");
            Vec::new()
        }
    }
}

/// Builds an `Added` event unless the path names a compositor output
fn added_event(path: &Path, is_rename: bool) -> Option<FileEvent> {
    if media::is_derived_output(path) {
        debug!(path = %path.display(), "Filtering compositor output from watch stream");
        return None;
    }
    debug!(path = %path.display(), is_rename, "Mapped Add event");
    Some(FileEvent::Added {
        path: path.to_path_buf(),
        is_rename,
    })
}

// ============================================================================
// FolderWatcher
// ============================================================================

/// Watches one folder tree using the OS-native mechanism
///
/// On Linux this typically uses inotify. The watcher converts raw OS events
/// into [`FileEvent`] values and sends them through an mpsc channel. Dropping
/// the watcher stops the watch; at most one is active per supervisor, and a
/// restart always drops the prior instance first.
pub struct FolderWatcher {
    /// The underlying notify watcher instance (kept alive for the watch)
    _watcher: RecommendedWatcher,
    /// The root being watched
    root: PathBuf,
}

impl FolderWatcher {
    /// Starts a recursive watch of `root`
    ///
    /// Returns the watcher and a receiver yielding [`FileEvent`] values as
    /// changes occur. Watcher-internal errors are logged and reported as
    /// events are; they never tear the watch down.
    ///
    /// # Errors
    /// Returns an error if the OS watcher cannot be created or the path
    /// cannot be watched (missing directory, inotify limit, permissions).
    pub fn start(root: &Path) -> Result<(Self, mpsc::Receiver<FileEvent>)> {
        let (event_tx, event_rx) = mpsc::channel::<FileEvent>(1024);
        let tx = event_tx.clone();
        let root_for_callback = root.to_path_buf();

        info!(root = %root.display(), "Starting recursive watch");

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for mapped in map_notify_event(&event, &root_for_callback) {
                        if let Err(e) = tx.blocking_send(mapped) {
                            warn!(error = %e, "Failed to send file event (receiver dropped)");
                        }
                    }
                }
                Err(err) => {
                    // Reported upward through the log; events unaffected by
                    // the error keep flowing.
                    error!(error = %err, "Folder watcher error");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create folder watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch folder: {}", root.display()))?;

        Ok((
            Self {
                _watcher: watcher,
                root: root.to_path_buf(),
            },
            event_rx,
        ))
    }

    /// Returns the root being watched
    pub fn root(&self) -> &Path {
        &self.root
    }
}

// ============================================================================
// WatchSupervisor
// ============================================================================

/// Why the event loop for one watch instance ended
enum WatchOutcome {
    /// Shutdown was requested, or every event source closed
    Finished,
    /// The watched root disappeared; a replacement folder is needed
    RootLost,
}

/// Owns the watch lifecycle and feeds the sync queues
///
/// Exactly one watch is active at a time; every restart (initial start,
/// root-loss recovery) drops the prior watcher before creating the next one.
/// When the root disappears, the supervisor pauses — buffering nothing — and
/// asks the folder picker for a replacement; "cancelled" leaves the pipeline
/// paused until shutdown.
pub struct WatchSupervisor {
    add_tx: mpsc::Sender<UploadTask>,
    delete_tx: mpsc::Sender<DeleteTask>,
    picker: Arc<dyn IFolderPicker>,
    notifier: Arc<dyn INotifier>,
    activity: Arc<dyn IActivityLog>,
}

impl WatchSupervisor {
    /// Creates a supervisor feeding the given queue channels
    pub fn new(
        add_tx: mpsc::Sender<UploadTask>,
        delete_tx: mpsc::Sender<DeleteTask>,
        picker: Arc<dyn IFolderPicker>,
        notifier: Arc<dyn INotifier>,
        activity: Arc<dyn IActivityLog>,
    ) -> Self {
        Self {
            add_tx,
            delete_tx,
            picker,
            notifier,
            activity,
        }
    }

    /// Watches `folder` (and any replacements) until shutdown
    ///
    /// Stopping the watch does not cancel in-flight queue drains; it only
    /// stops new events from being captured.
    pub async fn run(&self, folder: PathBuf, shutdown: CancellationToken) -> Result<()> {
        let mut root = folder;

        loop {
            let (watcher, mut events) = FolderWatcher::start(&root)?;
            self.notifier
                .notify(
                    "Monitoring Started",
                    &format!("Folder in sync: {}", root.display()),
                )
                .await;
            self.activity
                .log_event("watch_started", &root.display().to_string());

            let outcome = self.pump_events(&mut events, &shutdown).await;

            // Close the active handle before anything else happens.
            drop(watcher);

            match outcome {
                WatchOutcome::Finished => {
                    self.notifier
                        .notify("Monitoring Stopped", "Folder sync has ended")
                        .await;
                    self.activity
                        .log_event("watch_stopped", &root.display().to_string());
                    return Ok(());
                }
                WatchOutcome::RootLost => {
                    warn!(root = %root.display(), "Watched folder was deleted or renamed");
                    self.notifier
                        .notify(
                            "Folder Renamed or Deleted",
                            "The synced folder is gone. Select a new folder to continue.",
                        )
                        .await;
                    self.activity
                        .log_event("watch_root_lost", &root.display().to_string());

                    match self.picker.pick_folder().await {
                        Some(replacement) => {
                            info!(root = %replacement.display(), "Resuming watch on replacement folder");
                            root = replacement;
                        }
                        None => {
                            // Paused: no events are processed until shutdown.
                            info!("Folder selection cancelled, pipeline paused");
                            shutdown.cancelled().await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Routes events into the queues until shutdown or root loss
    async fn pump_events(
        &self,
        events: &mut mpsc::Receiver<FileEvent>,
        shutdown: &CancellationToken,
    ) -> WatchOutcome {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return WatchOutcome::Finished,

                event = events.recv() => match event {
                    Some(FileEvent::Added { path, is_rename }) => {
                        self.activity.log_event("file_added", &path.display().to_string());
                        let task = UploadTask { source_path: path, is_rename };
                        if self.add_tx.send(task).await.is_err() {
                            warn!("Add queue closed, stopping watch");
                            return WatchOutcome::Finished;
                        }
                    }
                    Some(FileEvent::Removed(path)) => {
                        self.activity.log_event("file_removed", &path.display().to_string());
                        if self.delete_tx.send(DeleteTask { path }).await.is_err() {
                            warn!("Delete queue closed, stopping watch");
                            return WatchOutcome::Finished;
                        }
                    }
                    Some(FileEvent::RootRemoved) => return WatchOutcome::RootLost,
                    None => return WatchOutcome::Finished,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    // ------------------------------------------------------------------
    // Event mapping tests
    // ------------------------------------------------------------------

    const ROOT: &str = "/photos/event";

    fn map(kind: EventKind, paths: Vec<PathBuf>) -> Vec<FileEvent> {
        let event = notify::Event {
            kind,
            paths,
            attrs: Default::default(),
        };
        map_notify_event(&event, Path::new(ROOT))
    }

    #[test]
    fn test_map_file_create() {
        let events = map(
            EventKind::Create(CreateKind::File),
            vec![PathBuf::from("/photos/event/a.jpg")],
        );
        assert_eq!(
            events,
            vec![FileEvent::Added {
                path: PathBuf::from("/photos/event/a.jpg"),
                is_rename: false,
            }]
        );
    }

    #[test]
    fn test_map_folder_create_ignored() {
        let events = map(
            EventKind::Create(CreateKind::Folder),
            vec![PathBuf::from("/photos/event/subdir")],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_map_derived_output_create_is_filtered() {
        let events = map(
            EventKind::Create(CreateKind::File),
            vec![PathBuf::from("/photos/event/a_framed.jpg")],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_map_file_remove() {
        let events = map(
            EventKind::Remove(notify::event::RemoveKind::File),
            vec![PathBuf::from("/photos/event/a.jpg")],
        );
        assert_eq!(
            events,
            vec![FileEvent::Removed(PathBuf::from("/photos/event/a.jpg"))]
        );
    }

    #[test]
    fn test_map_root_remove() {
        let events = map(
            EventKind::Remove(notify::event::RemoveKind::Folder),
            vec![PathBuf::from(ROOT)],
        );
        assert_eq!(events, vec![FileEvent::RootRemoved]);
    }

    #[test]
    fn test_map_non_root_folder_remove_ignored() {
        let events = map(
            EventKind::Remove(RemoveKind::Folder),
            vec![PathBuf::from("/photos/event/subdir")],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_map_rename_within_tree() {
        let events = map(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            vec![
                PathBuf::from("/photos/event/old.jpg"),
                PathBuf::from("/photos/event/new.jpg"),
            ],
        );
        assert_eq!(
            events,
            vec![
                FileEvent::Removed(PathBuf::from("/photos/event/old.jpg")),
                FileEvent::Added {
                    path: PathBuf::from("/photos/event/new.jpg"),
                    is_rename: true,
                },
            ]
        );
    }

    #[test]
    fn test_map_root_renamed_away() {
        let events = map(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            vec![PathBuf::from(ROOT)],
        );
        assert_eq!(events, vec![FileEvent::RootRemoved]);
    }

    #[test]
    fn test_map_rename_to_derived_output_keeps_only_removal() {
        let events = map(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            vec![
                PathBuf::from("/photos/event/a.jpg"),
                PathBuf::from("/photos/event/a_framed.jpg"),
            ],
        );
        assert_eq!(
            events,
            vec![FileEvent::Removed(PathBuf::from("/photos/event/a.jpg"))]
        );
    }

    #[test]
    fn test_map_data_modify_ignored() {
        let events = map(
            EventKind::Modify(ModifyKind::Data(notify::event::DataChange::Content)),
            vec![PathBuf::from("/photos/event/a.jpg")],
        );
        assert!(events.is_empty());
    }

    // ------------------------------------------------------------------
    // Live watcher tests
    // ------------------------------------------------------------------

    async fn recv_event(rx: &mut mpsc::Receiver<FileEvent>) -> FileEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for watch event")
            .expect("watch channel closed")
    }

    #[tokio::test]
    async fn test_watcher_reports_file_creation() {
        let dir = tempfile::tempdir().unwrap();
        let (_watcher, mut rx) = FolderWatcher::start(dir.path()).unwrap();

        let path = dir.path().join("fresh.jpg");
        std::fs::write(&path, b"bytes").unwrap();

        loop {
            if let FileEvent::Added { path: seen, .. } = recv_event(&mut rx).await {
                assert_eq!(seen, path);
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_watcher_never_reports_derived_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (_watcher, mut rx) = FolderWatcher::start(dir.path()).unwrap();

        std::fs::write(dir.path().join("photo_framed.jpg"), b"derived").unwrap();
        // A marker file afterwards proves the stream stayed silent about the
        // derived file rather than just being slow.
        std::fs::write(dir.path().join("zz_marker.jpg"), b"marker").unwrap();

        loop {
            match recv_event(&mut rx).await {
                FileEvent::Added { path, .. } => {
                    assert_eq!(path.file_name().unwrap(), "zz_marker.jpg");
                    break;
                }
                _ => continue,
            }
        }
    }

    // ------------------------------------------------------------------
    // Supervisor tests
    // ------------------------------------------------------------------

    struct CancelledPicker;

    #[async_trait::async_trait]
    impl IFolderPicker for CancelledPicker {
        async fn pick_folder(&self) -> Option<PathBuf> {
            None
        }
    }

    /// Picker that offers a replacement folder once, then reports cancelled
    struct OneShotPicker {
        replacement: std::sync::Mutex<Option<PathBuf>>,
    }

    #[async_trait::async_trait]
    impl IFolderPicker for OneShotPicker {
        async fn pick_folder(&self) -> Option<PathBuf> {
            self.replacement.lock().unwrap().take()
        }
    }

    struct SilentNotifier;

    #[async_trait::async_trait]
    impl INotifier for SilentNotifier {
        async fn notify(&self, _title: &str, _body: &str) {}
    }

    struct SilentActivity;

    impl IActivityLog for SilentActivity {
        fn log_event(&self, _category: &str, _details: &str) {}
    }

    #[tokio::test]
    async fn test_supervisor_routes_adds_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let (add_tx, mut add_rx) = mpsc::channel(16);
        let (delete_tx, mut delete_rx) = mpsc::channel(16);
        let shutdown = CancellationToken::new();

        let supervisor = WatchSupervisor::new(
            add_tx,
            delete_tx,
            Arc::new(CancelledPicker),
            Arc::new(SilentNotifier),
            Arc::new(SilentActivity),
        );

        let root = dir.path().to_path_buf();
        let run = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { supervisor.run(root, shutdown).await }
        });

        // Give the watch a moment to establish before touching the tree.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let file = dir.path().join("shot.jpg");
        std::fs::write(&file, b"bytes").unwrap();
        let task = tokio::time::timeout(Duration::from_secs(5), add_rx.recv())
            .await
            .expect("timed out waiting for upload task")
            .expect("add channel closed");
        assert_eq!(task.source_path, file);
        assert!(!task.is_rename);

        std::fs::remove_file(&file).unwrap();
        let task = tokio::time::timeout(Duration::from_secs(5), delete_rx.recv())
            .await
            .expect("timed out waiting for delete task")
            .expect("delete channel closed");
        assert_eq!(task.path, file);

        shutdown.cancel();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_supervisor_resumes_on_replacement_folder() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("watched");
        std::fs::create_dir(&root).unwrap();
        let replacement = parent.path().join("replacement");
        std::fs::create_dir(&replacement).unwrap();

        let (add_tx, mut add_rx) = mpsc::channel(16);
        let (delete_tx, _delete_rx) = mpsc::channel(16);
        let shutdown = CancellationToken::new();

        let supervisor = WatchSupervisor::new(
            add_tx,
            delete_tx,
            Arc::new(OneShotPicker {
                replacement: std::sync::Mutex::new(Some(replacement.clone())),
            }),
            Arc::new(SilentNotifier),
            Arc::new(SilentActivity),
        );

        let run = tokio::spawn({
            let root = root.clone();
            let shutdown = shutdown.clone();
            async move { supervisor.run(root, shutdown).await }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::remove_dir(&root).unwrap();

        // Let the replacement watch establish, then add a file under it.
        tokio::time::sleep(Duration::from_millis(500)).await;
        let file = replacement.join("after_recovery.jpg");
        std::fs::write(&file, b"bytes").unwrap();

        let task = tokio::time::timeout(Duration::from_secs(5), add_rx.recv())
            .await
            .expect("timed out waiting for upload task from replacement folder")
            .expect("add channel closed");
        assert_eq!(task.source_path, file);
        assert!(!task.is_rename);

        shutdown.cancel();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_supervisor_pauses_after_root_loss_when_cancelled() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("watched");
        std::fs::create_dir(&root).unwrap();

        let (add_tx, mut add_rx) = mpsc::channel(16);
        let (delete_tx, _delete_rx) = mpsc::channel(16);
        let shutdown = CancellationToken::new();

        let supervisor = WatchSupervisor::new(
            add_tx,
            delete_tx,
            Arc::new(CancelledPicker),
            Arc::new(SilentNotifier),
            Arc::new(SilentActivity),
        );

        let run = tokio::spawn({
            let root = root.clone();
            let shutdown = shutdown.clone();
            async move { supervisor.run(root, shutdown).await }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::remove_dir(&root).unwrap();

        // Paused: no events are accepted, and nothing ever reaches the queues.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(add_rx.try_recv().is_err());
        assert!(!run.is_finished());

        // Shutdown releases the paused supervisor.
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("supervisor did not stop after shutdown")
            .unwrap()
            .unwrap();
    }
}
