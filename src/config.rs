//! Runtime configuration resolved from the process environment.
//!
//! [`AppConfig`] is built once at startup and handed to the gateway, the advisory
//! client and the web server. Nothing below this module reads the environment.

use crate::error::{LocalFixError, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_BIND: &str = "0.0.0.0:8501";
pub const DEFAULT_WRAP_WIDTH: usize = 80;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Complete configuration for one LocalFix process
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout: Duration,
    pub bind: SocketAddr,
    pub wrap_width: usize,
    pub legacy_png_media_type: bool,
    pub max_upload_bytes: usize,
    /// Cap on generated tokens; `None` leaves the provider default
    pub max_output_tokens: Option<u32>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("bind", &self.bind)
            .field("wrap_width", &self.wrap_width)
            .field("legacy_png_media_type", &self.legacy_png_media_type)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl AppConfig {
    /// Configuration with defaults for everything except the API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bind: SocketAddr::from(([0, 0, 0, 0], 8501)),
            wrap_width: DEFAULT_WRAP_WIDTH,
            legacy_png_media_type: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_output_tokens: None,
        }
    }

    /// Read configuration from the process environment.
    ///
    /// Fails with [`LocalFixError::ConfigError`] when `GEMINI_API_KEY` is missing or blank,
    /// or when any optional setting is present but unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                LocalFixError::ConfigError(
                    "GEMINI_API_KEY is not set; add it to the environment or a .env file"
                        .to_string(),
                )
            })?;

        let mut config = Self::with_api_key(api_key);

        if let Some(model) = lookup("LOCALFIX_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(raw) = lookup("LOCALFIX_TEMPERATURE") {
            let temperature: f32 = parse_setting("LOCALFIX_TEMPERATURE", &raw)?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(LocalFixError::ConfigError(format!(
                    "LOCALFIX_TEMPERATURE must be between 0 and 2, got {}",
                    temperature
                )));
            }
            config.temperature = temperature;
        }

        if let Some(url) = lookup("GEMINI_API_ENDPOINT").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("LOCALFIX_TIMEOUT_SECS") {
            let secs: u64 = parse_setting("LOCALFIX_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(LocalFixError::ConfigError(
                    "LOCALFIX_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        let bind = lookup("LOCALFIX_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        config.bind = parse_setting("LOCALFIX_BIND", &bind)?;

        if let Some(raw) = lookup("LOCALFIX_WRAP_WIDTH") {
            let width: usize = parse_setting("LOCALFIX_WRAP_WIDTH", &raw)?;
            if width == 0 {
                return Err(LocalFixError::ConfigError(
                    "LOCALFIX_WRAP_WIDTH must be greater than zero".to_string(),
                ));
            }
            config.wrap_width = width;
        }

        if let Some(raw) = lookup("LOCALFIX_LEGACY_PNG_MEDIA_TYPE") {
            config.legacy_png_media_type = parse_flag("LOCALFIX_LEGACY_PNG_MEDIA_TYPE", &raw)?;
        }

        if let Some(raw) = lookup("LOCALFIX_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_setting("LOCALFIX_MAX_UPLOAD_BYTES", &raw)?;
        }

        if let Some(raw) = lookup("LOCALFIX_MAX_OUTPUT_TOKENS").filter(|r| !r.trim().is_empty()) {
            let tokens: u32 = parse_setting("LOCALFIX_MAX_OUTPUT_TOKENS", &raw)?;
            if tokens == 0 {
                return Err(LocalFixError::ConfigError(
                    "LOCALFIX_MAX_OUTPUT_TOKENS must be greater than zero".to_string(),
                ));
            }
            config.max_output_tokens = Some(tokens);
        }

        Ok(config)
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| LocalFixError::ConfigError(format!("{} has invalid value {:?}: {}", key, raw, e)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(LocalFixError::ConfigError(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let result = AppConfig::from_lookup(lookup_from(&[]));

        match result {
            Err(LocalFixError::ConfigError(msg)) => assert!(msg.contains("GEMINI_API_KEY")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_api_key_fails_fast() {
        let result = AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")]));
        assert!(matches!(result, Err(LocalFixError::ConfigError(_))));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.bind.port(), 8501);
        assert_eq!(config.wrap_width, 80);
        assert!(!config.legacy_png_media_type);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_output_tokens, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LOCALFIX_MODEL", "gemini-2.0-flash"),
            ("LOCALFIX_TEMPERATURE", "0.7"),
            ("GEMINI_API_ENDPOINT", "http://localhost:9999/v1beta/"),
            ("LOCALFIX_TIMEOUT_SECS", "5"),
            ("LOCALFIX_BIND", "127.0.0.1:3000"),
            ("LOCALFIX_WRAP_WIDTH", "40"),
            ("LOCALFIX_LEGACY_PNG_MEDIA_TYPE", "true"),
            ("LOCALFIX_MAX_UPLOAD_BYTES", "1024"),
            ("LOCALFIX_MAX_OUTPUT_TOKENS", "512"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.bind, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.wrap_width, 40);
        assert!(config.legacy_png_media_type);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.max_output_tokens, Some(512));
    }

    #[test]
    fn test_zero_max_output_tokens_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LOCALFIX_MAX_OUTPUT_TOKENS", "0"),
        ]));
        assert!(matches!(result, Err(LocalFixError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_temperature() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LOCALFIX_TEMPERATURE", "warm"),
        ]));
        assert!(matches!(result, Err(LocalFixError::ConfigError(_))));

        let result = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LOCALFIX_TEMPERATURE", "3.5"),
        ]));
        assert!(matches!(result, Err(LocalFixError::ConfigError(_))));
    }

    #[test]
    fn test_zero_wrap_width_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LOCALFIX_WRAP_WIDTH", "0"),
        ]));
        assert!(matches!(result, Err(LocalFixError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_flag() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LOCALFIX_LEGACY_PNG_MEDIA_TYPE", "maybe"),
        ]));
        assert!(matches!(result, Err(LocalFixError::ConfigError(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AppConfig::with_api_key("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
