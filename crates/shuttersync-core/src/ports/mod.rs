//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteSyncClient`] - Upload, remote delete, and frame-asset fetch
//! - [`ISessionProvider`] - Current token and configured identity
//! - [`INotifier`] - Fire-and-forget user notifications
//! - [`IActivityLog`] - Fire-and-forget activity journal
//! - [`IFolderPicker`] - Replacement-folder selection after root loss

pub mod activity;
pub mod folder_picker;
pub mod notifier;
pub mod remote;
pub mod session;

pub use activity::IActivityLog;
pub use folder_picker::IFolderPicker;
pub use notifier::INotifier;
pub use remote::{IRemoteSyncClient, RemoteError, UploadReceipt};
pub use session::ISessionProvider;
