//! ShutterSync API - HTTP adapter for the event-photo service
//!
//! Implements the [`IRemoteSyncClient`](shuttersync_core::ports::IRemoteSyncClient)
//! port against the remote event-photo API:
//! - multipart photo upload with identity metadata
//! - remote object deletion with an explicit timeout budget
//! - frame-asset download for the compositor

pub mod client;

pub use client::HttpSyncClient;
