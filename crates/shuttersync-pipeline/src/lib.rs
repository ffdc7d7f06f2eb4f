//! ShutterSync Pipeline - folder watch and sequential sync queues
//!
//! Provides:
//! - A `notify`-based recursive folder watcher with typed events and
//!   root-loss recovery
//! - Debounced add/delete queues with strictly sequential drains and
//!   asymmetric failure policies
//! - Content-digest deduplication backed by a persisted upload ledger
//! - An optional frame-overlay compositing step before upload
//!
//! ## Modules
//!
//! - [`watcher`] - `FolderWatcher`, `WatchSupervisor`, and the event mapping
//! - [`queue`] - the coalescing-then-sequential-drain queue drivers
//! - [`processor`] - the per-file upload and delete procedures
//! - [`compositor`] - orientation-matched frame overlay
//! - [`ledger`] - the persisted digest-to-upload-record registry
//! - [`hasher`] - streaming SHA-256 content digests

pub mod compositor;
pub mod hasher;
pub mod ledger;
pub mod processor;
pub mod queue;
pub mod watcher;

pub use processor::FileProcessor;
pub use queue::{DeleteTask, QueueConfig, UploadTask};
pub use watcher::{FileEvent, FolderWatcher, WatchSupervisor};
