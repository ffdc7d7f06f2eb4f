//! Activity log port (driven/secondary port)
//!
//! A lightweight journal of pipeline events (watch started, file added,
//! upload succeeded/failed, ...). Like the notifier this is fire-and-forget;
//! no failure here may ever break a sync operation.

/// Port trait for the activity journal
pub trait IActivityLog: Send + Sync {
    /// Records one event under a category with free-form details
    fn log_event(&self, category: &str, details: &str);
}
