//! Configuration and settings management
//!
//! Loads settings from environment variables and defines the tunables
//! for translation, pagination and broadcast pacing.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token. The only mandatory setting: without it
    /// the process cannot start.
    pub telegram_token: String,

    /// Gemini API key. Optional; translation degrades to a fixed
    /// user-facing message when absent.
    pub gemini_api_key: Option<String>,

    /// Telegram user ID of the administrator. Optional; admin commands
    /// and the support relay fail closed when unset.
    #[serde(rename = "admin_id")]
    pub admin_id_str: Option<String>,

    /// Public HTTPS URL for webhook delivery. When unset the bot falls
    /// back to long polling.
    pub webhook_url: Option<String>,

    /// Local port the webhook listener binds to
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,

    /// Fallback target language code for new sessions
    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
}

const fn default_webhook_port() -> u16 {
    8443
}

fn default_target_lang() -> String {
    "en".to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails, including the fatal
    /// case of a missing `TELEGRAM_TOKEN`.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Fallback: check environment variables directly if config didn't
        // pick them up
        if settings.gemini_api_key.is_none() {
            if let Ok(val) = std::env::var("GEMINI_API_KEY") {
                if !val.is_empty() {
                    settings.gemini_api_key = Some(val);
                }
            }
        }
        if settings.admin_id_str.is_none() {
            if let Ok(val) = std::env::var("ADMIN_ID") {
                if !val.is_empty() {
                    settings.admin_id_str = Some(val);
                }
            }
        }

        Ok(settings)
    }

    /// Telegram ID of the administrator, if one is configured and the
    /// configured value parses as an ID. A malformed value is treated as
    /// unset, so admin features stay fail-closed.
    #[must_use]
    pub fn admin_id(&self) -> Option<i64> {
        self.admin_id_str
            .as_ref()
            .and_then(|s| s.trim().parse::<i64>().ok())
    }
}

/// Gemini model used for translation requests
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default timeout for the translation HTTP call, in seconds
pub const TRANSLATE_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default minimum delay between broadcast sends, in milliseconds
pub const BROADCAST_INTERVAL_MS: u64 = 100;

/// Time-to-live for support relay correlations, in seconds
pub const RELAY_TTL_SECS: u64 = 7 * 24 * 3600;

/// Maximum number of tracked relay correlations
pub const RELAY_MAX_ENTRIES: u64 = 10_000;

/// Get translation HTTP timeout from env or default.
///
/// Environment variable: `TRANSLATE_HTTP_TIMEOUT_SECS`.
#[must_use]
pub fn get_translate_http_timeout_secs() -> u64 {
    std::env::var("TRANSLATE_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(TRANSLATE_HTTP_TIMEOUT_SECS)
}

/// Get minimum broadcast send interval from env or default.
///
/// Environment variable: `BROADCAST_INTERVAL_MS`.
#[must_use]
pub fn get_broadcast_interval_ms() -> u64 {
    std::env::var("BROADCAST_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(BROADCAST_INTERVAL_MS)
}
