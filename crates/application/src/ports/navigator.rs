//! Navigation port

/// Entry point the user is sent to when the session ends.
pub const LOGIN_ROUTE: &str = "/login";

/// Port for moving the user to another screen.
///
/// The refresh coordinator uses it to force the login screen after a
/// failed refresh; logout uses it the same way.
pub trait Navigator: Send + Sync {
    /// Navigates to `route`.
    fn navigate(&self, route: &str);
}
