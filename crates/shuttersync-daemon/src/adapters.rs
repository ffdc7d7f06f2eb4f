//! Headless adapter implementations for the daemon
//!
//! The daemon runs without a UI, so the interactive ports get the simplest
//! honest implementations: session state comes from the configuration file,
//! notifications and the activity journal go to the structured log, and the
//! folder picker always reports "cancelled".

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use shuttersync_core::config::SessionConfig;
use shuttersync_core::domain::Identity;
use shuttersync_core::ports::{IActivityLog, IFolderPicker, INotifier, ISessionProvider};

/// Session state provisioned from the configuration file
///
/// The token and identity are fixed for the lifetime of the process; updating
/// them means editing the config and restarting the daemon.
pub struct ConfigSessionProvider {
    token: Option<String>,
    identity: Option<Identity>,
}

impl ConfigSessionProvider {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            token: session.token,
            identity: session.identity,
        }
    }
}

impl ISessionProvider for ConfigSessionProvider {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

/// Notifier that writes user-facing messages to the log
pub struct LogNotifier;

#[async_trait]
impl INotifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) {
        info!(title, body, "Notification");
    }
}

/// Activity journal backed by the structured log
pub struct LogActivityJournal;

impl IActivityLog for LogActivityJournal {
    fn log_event(&self, category: &str, details: &str) {
        info!(category, details, "Activity");
    }
}

/// Folder picker for a headless process
///
/// Always reports "cancelled", leaving the pipeline paused after root loss.
/// A new folder is set by editing the config and restarting.
pub struct HeadlessFolderPicker;

#[async_trait]
impl IFolderPicker for HeadlessFolderPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        warn!("No interactive folder picker available, staying paused");
        None
    }
}
