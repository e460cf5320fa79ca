/// Outbound notifications
///
/// The account flows hand this layer a summary of what happened (a
/// reset link to deliver, a completed password change to confirm); it
/// owns formatting and delivery. Delivery currently writes structured
/// log records; the methods are the seam where a real mail transport
/// plugs in.
///
/// Notifications are fire-and-forget: handlers spawn them so a slow or
/// failing delivery never delays the HTTP response.

use tracing::info;

/// Formats and delivers account notifications
#[derive(Debug, Clone)]
pub struct Notifier {
    /// Public base URL embedded in reset links
    base_url: String,
}

impl Notifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Builds the reset link a user follows to choose a new password
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.base_url, token)
    }

    /// Delivers a password-reset link to its owner
    pub async fn send_reset_link(&self, email: &str, username: &str, token: &str) {
        let link = self.reset_link(token);

        info!(
            recipient = email,
            username,
            %link,
            "Password reset link issued"
        );
    }

    /// Confirms to the user that their password was changed
    ///
    /// Sent after every successful change so an owner who did not
    /// initiate it finds out immediately.
    pub async fn send_password_changed(&self, email: &str, username: &str) {
        info!(
            recipient = email,
            username,
            "Password changed notification sent"
        );
    }
}
