//! Client configuration loading
//!
//! Settings are resolved in order of priority:
//! 1. JSON file in the Mailroom config directory (mailroom.json)
//! 2. Environment variables (MAILROOM_API_URL, MAILROOM_DOMAIN, ...)
//! 3. Built-in defaults

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Settings filename in the Mailroom config directory
const CONFIG_FILE: &str = "mailroom.json";

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_DOMAIN: &str = "mailroom.local";
pub const DEFAULT_SEND_ACK_MS: u64 = 1200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which session source counts as "logged in" at startup
///
/// The backend may hold a cookie session while the locally persisted token is
/// gone. The two are never reconciled, so the choice is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
    /// No local token means not logged in; restore makes no network call
    #[default]
    LocalToken,
    /// Without a local token, still ask the backend who the cookie belongs to
    ServerCookie,
}

impl SessionSource {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local_token" | "local" => Ok(Self::LocalToken),
            "server_cookie" | "cookie" => Ok(Self::ServerCookie),
            other => bail!("Unknown session source: {}", other),
        }
    }
}

/// Runtime settings for the mail client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, e.g. "https://mail.example.com/api"
    pub api_url: String,
    /// Domain appended to every normalized address
    pub address_domain: String,
    /// How long the compose window shows the "sent" acknowledgement
    pub send_ack_ms: u64,
    /// Per-request timeout for the HTTP gateway
    pub request_timeout_secs: u64,
    pub session_source: SessionSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            address_domain: DEFAULT_DOMAIN.to_string(),
            send_ack_ms: DEFAULT_SEND_ACK_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_source: SessionSource::default(),
        }
    }
}

impl ClientConfig {
    /// Load settings using the following priority:
    /// 1. ~/.config/mailroom/mailroom.json
    /// 2. Environment variables
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        if config::config_exists(CONFIG_FILE) {
            let cfg: ClientConfig = config::load_json(CONFIG_FILE)?;
            cfg.validate()?;
            return Ok(cfg);
        }

        Self::from_env()
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: ClientConfig = config::load_json_file(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse settings from a JSON string; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: ClientConfig =
            serde_json::from_str(json).context("Failed to parse client config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load settings from environment variables, defaulting unset ones
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (environment-shaped)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("MAILROOM_API_URL") {
            cfg.api_url = url;
        }
        if let Some(domain) = lookup("MAILROOM_DOMAIN") {
            cfg.address_domain = domain;
        }
        if let Some(source) = lookup("MAILROOM_SESSION_SOURCE") {
            cfg.session_source = SessionSource::parse(&source)?;
        }
        if let Some(ms) = lookup("MAILROOM_SEND_ACK_MS") {
            cfg.send_ack_ms = ms
                .parse()
                .with_context(|| format!("MAILROOM_SEND_ACK_MS is not a number: {}", ms))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API URL: {}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("API URL must be http or https: {}", self.api_url);
        }
        if self.address_domain.trim().is_empty() || self.address_domain.contains('@') {
            bail!("Invalid address domain: {:?}", self.address_domain);
        }
        Ok(())
    }

    pub fn send_ack_delay(&self) -> Duration {
        Duration::from_millis(self.send_ack_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the default settings file path (~/.config/mailroom/mailroom.json)
    pub fn default_config_path() -> Option<PathBuf> {
        config::config_path(CONFIG_FILE)
    }
}
