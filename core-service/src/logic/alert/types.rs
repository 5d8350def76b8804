use serde::{Deserialize, Serialize};

/// Composed notification, never persisted by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("endpoint rejected alert with status {status}")]
    Rejected { status: u16 },

    #[error("notification timed out")]
    Timeout,
}

/// Delivery channel for composed alerts.
///
/// `send` blocks; callers run it off the async executor.
pub trait NotificationTransport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &'static str;

    fn send(&self, subject: &str, body: &str, recipient: Option<&str>) -> Result<(), NotifyError>;

    fn send_payload(&self, payload: &AlertPayload, recipient: Option<&str>) -> Result<(), NotifyError> {
        self.send(&payload.subject, &payload.body, recipient)
    }
}
