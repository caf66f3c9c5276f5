//! Connection defaults shared by every client.
//!
//! # Design
//! `Settings` is built once (from defaults, a deserialized config file, or
//! the environment) and handed to each client constructor. Clients copy the
//! values into their own `ConnectionSettings`, so later changes to a
//! `Settings` value are not observed by clients that already exist.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_END_POINT: &str = "http://api.textrazor.com/";
pub const DEFAULT_SECURE_END_POINT: &str = "https://api.textrazor.com/";

/// The service stops analysis after 30 seconds on its own. The client waits
/// longer so transport stalls surface as timeouts instead of hangs.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Defaults applied to every new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub end_point: String,
    pub secure_end_point: String,
    pub enable_encryption: bool,
    pub enable_compression: bool,
    /// Connection phase limit; 0 disables it.
    pub connect_timeout_seconds: u64,
    /// Whole-request limit; 0 disables it.
    pub timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            end_point: DEFAULT_END_POINT.to_string(),
            secure_end_point: DEFAULT_SECURE_END_POINT.to_string(),
            enable_encryption: true,
            enable_compression: true,
            connect_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TEXTRAZOR_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Settings::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(key) = lookup("TEXTRAZOR_API_KEY") {
            settings.api_key = Some(key);
        }
        if let Some(end_point) = lookup("TEXTRAZOR_ENDPOINT") {
            settings.end_point = end_point;
        }
        if let Some(end_point) = lookup("TEXTRAZOR_SECURE_ENDPOINT") {
            settings.secure_end_point = end_point;
        }
        if let Some(raw) = lookup("TEXTRAZOR_ENABLE_ENCRYPTION") {
            settings.enable_encryption = parse_bool("TEXTRAZOR_ENABLE_ENCRYPTION", &raw)?;
        }
        if let Some(raw) = lookup("TEXTRAZOR_ENABLE_COMPRESSION") {
            settings.enable_compression = parse_bool("TEXTRAZOR_ENABLE_COMPRESSION", &raw)?;
        }
        if let Some(raw) = lookup("TEXTRAZOR_CONNECT_TIMEOUT_SECONDS") {
            settings.connect_timeout_seconds = parse_seconds("TEXTRAZOR_CONNECT_TIMEOUT_SECONDS", &raw)?;
        }
        if let Some(raw) = lookup("TEXTRAZOR_TIMEOUT_SECONDS") {
            settings.timeout_seconds = parse_seconds("TEXTRAZOR_TIMEOUT_SECONDS", &raw)?;
        }
        Ok(settings)
    }

    /// Parse a JSON document, filling missing fields with defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::validation(format!("invalid settings: {e}")))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_end_point(mut self, end_point: impl Into<String>) -> Self {
        self.end_point = end_point.into();
        self
    }

    pub fn with_secure_end_point(mut self, end_point: impl Into<String>) -> Self {
        self.secure_end_point = end_point.into();
        self
    }

    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.enable_encryption = enabled;
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }

    pub fn with_connect_timeout_seconds(mut self, seconds: u64) -> Self {
        self.connect_timeout_seconds = seconds;
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// 0 means "no limit".
pub(crate) fn seconds_to_timeout(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::validation(format!("{name} must be a bool, got {raw:?}"))),
    }
}

fn parse_seconds(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::validation(format!("{name} must be a whole number of seconds, got {raw:?}")))
}
