//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use airhealth_core::constants;
use airhealth_core::WebhookPlatform;

use crate::store::jsonl::MAX_FILE_SIZE;

/// Persistence backend for snapshots and prediction records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Jsonl,
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => StoreBackend::Memory,
            _ => StoreBackend::Jsonl,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Model artifact path
    pub model_path: String,

    /// Expected SHA-256 of the model artifact
    pub model_sha256: Option<String>,

    /// Advisory table override
    pub advisory_path: Option<String>,

    pub store_backend: StoreBackend,

    /// Directory of the JSONL store
    pub data_dir: PathBuf,

    /// Size at which a JSONL file is rotated
    pub store_max_file_bytes: u64,

    /// Alert webhook; alerts are dropped when unset
    pub webhook_url: Option<String>,

    pub webhook_platform: WebhookPlatform,

    /// Default alert recipient
    pub alert_to: Option<String>,

    /// Upper bound for one notification dispatch
    pub alert_timeout_secs: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_path: constants::get_model_path(),

            model_sha256: constants::get_model_checksum(),

            advisory_path: constants::get_advisory_path(),

            store_backend: env::var("STORE_BACKEND")
                .map(|s| StoreBackend::parse(&s))
                .unwrap_or(StoreBackend::Jsonl),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),

            store_max_file_bytes: env::var("STORE_MAX_FILE_MB")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|mb| *mb > 0)
                .map_or(MAX_FILE_SIZE, |mb| mb * 1024 * 1024),

            webhook_url: non_empty_var("ALERT_WEBHOOK_URL"),

            webhook_platform: env::var("ALERT_WEBHOOK_PLATFORM")
                .map(|s| WebhookPlatform::parse(&s))
                .unwrap_or(WebhookPlatform::Generic),

            alert_to: non_empty_var("ALERT_TO"),

            alert_timeout_secs: env::var("ALERT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_secs)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            model_path: constants::DEFAULT_MODEL_PATH.to_string(),
            model_sha256: None,
            advisory_path: None,
            store_backend: StoreBackend::Memory,
            data_dir: default_data_dir(),
            store_max_file_bytes: MAX_FILE_SIZE,
            webhook_url: None,
            webhook_platform: WebhookPlatform::Generic,
            alert_to: None,
            alert_timeout_secs: 10,
            environment: "development".to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airhealth")
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse("memory"), StoreBackend::Memory);
        assert_eq!(StoreBackend::parse(" JSONL "), StoreBackend::Jsonl);
        assert_eq!(StoreBackend::parse("postgres"), StoreBackend::Jsonl);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.alert_timeout(), Duration::from_secs(10));
        assert!(!config.is_production());
        assert!(config.data_dir.ends_with("airhealth"));
        assert_eq!(config.store_max_file_bytes, 10 * 1024 * 1024);
    }
}
