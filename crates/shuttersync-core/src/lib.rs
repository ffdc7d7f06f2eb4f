//! ShutterSync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - identity/session data, frame configurations, the
//!   supported-media rules, and the upload error taxonomy
//! - **Port definitions** - Traits for adapters: `IRemoteSyncClient`,
//!   `ISessionProvider`, `INotifier`, `IActivityLog`, `IFolderPicker`
//! - **Configuration** - typed YAML configuration with defaults
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement. The pipeline
//! crate orchestrates domain rules through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
