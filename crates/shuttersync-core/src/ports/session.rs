//! Session provider port (driven/secondary port)
//!
//! The login flow and identity refresh live outside the core; the pipeline
//! only needs to ask "is there a token, and a complete identity, right now"
//! before every network call. Both accessors return snapshots so the session
//! can change between drains without coordination.

use crate::domain::Identity;

/// Port trait for the current session state
pub trait ISessionProvider: Send + Sync {
    /// Returns the current bearer token, if a session is active
    fn token(&self) -> Option<String>;

    /// Returns the configured identity, or `None` while it is incomplete
    fn identity(&self) -> Option<Identity>;
}
