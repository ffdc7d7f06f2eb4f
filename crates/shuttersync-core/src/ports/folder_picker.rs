//! Folder picker port (driving-side collaboration point)
//!
//! Invoked only when the watched root itself disappears. The adapter asks the
//! user (dialog, CLI prompt, or nothing at all in headless mode) for a
//! replacement folder; `None` means "cancelled" and leaves the pipeline
//! paused.

use std::path::PathBuf;

/// Port trait for selecting a replacement watch folder
#[async_trait::async_trait]
pub trait IFolderPicker: Send + Sync {
    /// Asks for a new folder to watch, returning `None` when cancelled
    async fn pick_folder(&self) -> Option<PathBuf>;
}
