//! Alert Module - Notification Composition & Delivery
//!
//! - `composer` - active predictions + feature snapshot → [`AlertPayload`]
//! - `webhook` - transports (webhook POST, null)

pub mod composer;
pub mod types;
pub mod webhook;

pub use composer::{compose, format_probability};
pub use types::{AlertPayload, NotificationTransport, NotifyError};
pub use webhook::{NullTransport, WebhookPlatform, WebhookTransport};
