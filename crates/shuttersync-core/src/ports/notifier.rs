//! Notifier port (driven/secondary port)
//!
//! Fire-and-forget user notifications. Delivery failures are the adapter's
//! problem; the pipeline never waits on or inspects the outcome, so the
//! trait returns nothing.

/// Port trait for user-facing notifications
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Shows a notification with the given title and body
    async fn notify(&self, title: &str, body: &str);
}
