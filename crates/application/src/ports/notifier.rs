//! Notification port

/// Port for transient user notifications.
///
/// Every call carries a correlation id so a later call can replace or
/// dismiss the notification an earlier one opened.
pub trait Notifier: Send + Sync {
    /// Shows a progress notification.
    fn loading(&self, id: &str, message: &str);

    /// Replaces the notification with a success message.
    fn success(&self, id: &str, message: &str);

    /// Replaces the notification with an error message.
    fn error(&self, id: &str, message: &str);

    /// Removes the notification.
    fn dismiss(&self, id: &str);
}
