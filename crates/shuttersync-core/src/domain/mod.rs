//! Domain types and business rules
//!
//! This module contains the core domain types for ShutterSync:
//! - The upload/delete error taxonomy and its queue-policy helpers
//! - Session identity and frame-overlay configurations
//! - Supported-media rules and the derived-output path marker

pub mod errors;
pub mod identity;
pub mod media;

// Re-export commonly used types
pub use errors::UploadError;
pub use identity::{FrameConfiguration, Identity, Orientation};
