//! Webhook Transport
//!
//! Blocking JSON POST with per-platform formatting. Recipient, when given,
//! overrides the configured default and is carried in the message.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{NotificationTransport, NotifyError};

/// Alert accent color (Discord embed, Slack attachment)
const ALERT_COLOR: &str = "#e67e22";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookPlatform {
    Slack,
    Discord,
    Generic,
}

impl WebhookPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookPlatform::Slack => "slack",
            WebhookPlatform::Discord => "discord",
            WebhookPlatform::Generic => "generic",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "slack" => WebhookPlatform::Slack,
            "discord" => WebhookPlatform::Discord,
            _ => WebhookPlatform::Generic,
        }
    }
}

// ============================================================================
// WEBHOOK TRANSPORT
// ============================================================================

pub struct WebhookTransport {
    url: String,
    platform: WebhookPlatform,
    default_recipient: Option<String>,
    agent: ureq::Agent,
}

impl WebhookTransport {
    pub fn new(
        url: impl Into<String>,
        platform: WebhookPlatform,
        default_recipient: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            platform,
            default_recipient,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Platform-specific JSON body
    pub fn format_payload(&self, subject: &str, body: &str, recipient: Option<&str>) -> String {
        match self.platform {
            WebhookPlatform::Slack => format_slack(subject, body, recipient),
            WebhookPlatform::Discord => format_discord(subject, body, recipient),
            WebhookPlatform::Generic => format_generic(subject, body, recipient),
        }
    }
}

impl NotificationTransport for WebhookTransport {
    fn name(&self) -> &'static str {
        self.platform.as_str()
    }

    fn send(&self, subject: &str, body: &str, recipient: Option<&str>) -> Result<(), NotifyError> {
        let recipient = recipient.or(self.default_recipient.as_deref());
        let formatted = self.format_payload(subject, body, recipient);

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&formatted);

        match response {
            Ok(resp) => {
                log::info!("Alert sent via {} webhook ({})", self.platform.as_str(), resp.status());
                Ok(())
            }
            Err(ureq::Error::Status(status, _)) => {
                log::error!("Webhook rejected alert: HTTP {}", status);
                Err(NotifyError::Rejected { status })
            }
            Err(ureq::Error::Transport(e)) => {
                log::error!("Failed to send alert: {}", e);
                if e.kind() == ureq::ErrorKind::Io && e.to_string().contains("timed out") {
                    Err(NotifyError::Timeout)
                } else {
                    Err(NotifyError::Network(e.to_string()))
                }
            }
        }
    }
}

fn format_slack(subject: &str, body: &str, recipient: Option<&str>) -> String {
    let mut blocks = vec![
        serde_json::json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": subject,
                "emoji": true
            }
        }),
        serde_json::json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("```{}```", body)
            }
        }),
    ];

    if let Some(to) = recipient {
        blocks.push(serde_json::json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("*To:* {}", to)
            }]
        }));
    }

    serde_json::json!({
        "text": subject,
        "blocks": blocks,
        "attachments": [{
            "color": ALERT_COLOR
        }]
    })
    .to_string()
}

fn format_discord(subject: &str, body: &str, recipient: Option<&str>) -> String {
    let mut message = serde_json::json!({
        "embeds": [{
            "title": subject,
            "description": body,
            "color": u32::from_str_radix(&ALERT_COLOR[1..], 16).unwrap_or(0),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }]
    });

    if let Some(to) = recipient {
        message["content"] = serde_json::Value::String(to.to_string());
    }

    message.to_string()
}

fn format_generic(subject: &str, body: &str, recipient: Option<&str>) -> String {
    serde_json::json!({
        "subject": subject,
        "body": body,
        "recipient": recipient,
        "timestamp": chrono::Utc::now().timestamp()
    })
    .to_string()
}

// ============================================================================
// NULL TRANSPORT
// ============================================================================

/// Used when no transport is configured: logs and drops
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl NotificationTransport for NullTransport {
    fn name(&self) -> &'static str {
        "none"
    }

    fn send(&self, subject: &str, _body: &str, recipient: Option<&str>) -> Result<(), NotifyError> {
        log::info!(
            "No notification transport configured, dropping alert '{}' (recipient: {:?})",
            subject,
            recipient
        );
        Ok(())
    }
}
