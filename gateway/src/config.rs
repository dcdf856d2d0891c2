//! Configuration module for environment variable parsing.
//!
//! Configuration is loaded once at startup and is immutable afterwards.
//! A missing shared secret or an unparseable setting is fatal before the
//! server binds to a port.

use std::env;

use thiserror::Error;

use crate::web::signature::ComparisonMode;

/// Default request body size limit.
pub const DEFAULT_BODY_LIMIT: &str = "50mb";

/// Fatal configuration errors raised before any route is registered.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("shared secret is not set; set SHOPIFY_SHARED_SECRET")]
    MissingSecret,

    #[error("invalid body size limit {0:?}; expected e.g. \"50mb\", \"512kb\" or a byte count")]
    InvalidBodyLimit(String),

    #[error("unknown HMAC comparison mode {0:?}; expected \"standard\" or \"escaped-slash\"")]
    InvalidComparisonMode(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret keying the webhook HMAC. Required, never empty.
    pub shared_secret: String,

    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,

    /// Digest comparison mode, see [`ComparisonMode`].
    pub comparison: ComparisonMode,

    /// Port for the gateway binary to listen on.
    pub port: u16,

    /// `module/handler` topics the stock binary mounts with a logging
    /// handler. Library users register their own modules instead.
    pub topics: Vec<String>,
}

impl Config {
    /// Create a configuration with the given shared secret and defaults
    /// for everything else.
    pub fn new(shared_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let shared_secret = shared_secret.into();
        if shared_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        Ok(Self {
            shared_secret,
            body_limit: parse_size_limit(DEFAULT_BODY_LIMIT)?,
            comparison: ComparisonMode::default(),
            port: 8080,
            topics: Vec::new(),
        })
    }

    /// Set the body size limit from a `"50mb"`-style size string.
    pub fn with_body_limit(mut self, limit: &str) -> Result<Self, ConfigError> {
        self.body_limit = parse_size_limit(limit)?;
        Ok(self)
    }

    /// Set the digest comparison mode.
    pub fn with_comparison(mut self, mode: ComparisonMode) -> Self {
        self.comparison = mode;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `SHOPIFY_SHARED_SECRET` (required), `BODY_LIMIT`,
    /// `HMAC_COMPARISON_MODE`, `PORT` and `WEBHOOK_TOPICS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(env::var("SHOPIFY_SHARED_SECRET").unwrap_or_default())?;

        if let Ok(raw) = env::var("BODY_LIMIT") {
            config.body_limit = parse_size_limit(&raw)?;
        }

        if let Ok(raw) = env::var("HMAC_COMPARISON_MODE") {
            config.comparison = parse_comparison_mode(&raw)?;
        }

        config.port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        config.topics = parse_csv("WEBHOOK_TOPICS").unwrap_or_default();

        Ok(config)
    }
}

/// Parse a size string like "50mb", "512kb" or "1048576" into bytes.
fn parse_size_limit(raw: &str) -> Result<usize, ConfigError> {
    let lowered = raw.trim().to_ascii_lowercase();

    let (digits, multiplier) = if let Some(v) = lowered.strip_suffix("kb") {
        (v, 1024)
    } else if let Some(v) = lowered.strip_suffix("mb") {
        (v, 1024 * 1024)
    } else if let Some(v) = lowered.strip_suffix("gb") {
        (v, 1024 * 1024 * 1024)
    } else if let Some(v) = lowered.strip_suffix('b') {
        (v, 1)
    } else {
        (lowered.as_str(), 1)
    };

    digits
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|value| value.checked_mul(multiplier))
        .ok_or_else(|| ConfigError::InvalidBodyLimit(raw.to_string()))
}

/// Parse a comparison mode name.
fn parse_comparison_mode(raw: &str) -> Result<ComparisonMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "standard" => Ok(ComparisonMode::Standard),
        "escaped-slash" | "escaped_slash" => Ok(ComparisonMode::EscapedSlash),
        _ => Err(ConfigError::InvalidComparisonMode(raw.to_string())),
    }
}

/// Parse a comma-separated list of strings from the environment.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_secret() {
        assert!(matches!(Config::new(""), Err(ConfigError::MissingSecret)));
        assert!(Config::new("secret").is_ok());
    }

    #[test]
    fn test_new_defaults() {
        let config = Config::new("secret").unwrap();
        assert_eq!(config.body_limit, 50 * 1024 * 1024);
        assert_eq!(config.comparison, ComparisonMode::Standard);
        assert_eq!(config.port, 8080);
        assert!(config.topics.is_empty());
    }

    #[test]
    fn test_parse_size_limit() {
        assert_eq!(parse_size_limit("50mb").unwrap(), 50 * 1024 * 1024);
        assert_eq!(parse_size_limit("512kb").unwrap(), 512 * 1024);
        assert_eq!(parse_size_limit("1gb").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size_limit("1024").unwrap(), 1024);
        assert_eq!(parse_size_limit("64b").unwrap(), 64);
        assert_eq!(parse_size_limit(" 2MB ").unwrap(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_limit_invalid() {
        assert!(parse_size_limit("").is_err());
        assert!(parse_size_limit("mb").is_err());
        assert!(parse_size_limit("ten megabytes").is_err());
        assert!(parse_size_limit("-5mb").is_err());
    }

    #[test]
    fn test_parse_comparison_mode() {
        assert_eq!(
            parse_comparison_mode("standard").unwrap(),
            ComparisonMode::Standard
        );
        assert_eq!(
            parse_comparison_mode("escaped-slash").unwrap(),
            ComparisonMode::EscapedSlash
        );
        assert_eq!(
            parse_comparison_mode("ESCAPED_SLASH").unwrap(),
            ComparisonMode::EscapedSlash
        );
        assert!(parse_comparison_mode("loose").is_err());
    }

    #[test]
    fn test_parse_csv() {
        env::set_var("TEST_TOPICS_CSV", "orders/create, orders/updated ,customers/delete");
        let result = parse_csv("TEST_TOPICS_CSV");
        assert_eq!(
            result,
            Some(vec![
                "orders/create".to_string(),
                "orders/updated".to_string(),
                "customers/delete".to_string()
            ])
        );
        env::remove_var("TEST_TOPICS_CSV");
    }

    #[test]
    fn test_parse_csv_missing() {
        assert_eq!(parse_csv("TEST_TOPICS_CSV_UNSET"), None);
    }

    #[test]
    fn test_with_body_limit() {
        let config = Config::new("secret").unwrap().with_body_limit("1mb").unwrap();
        assert_eq!(config.body_limit, 1024 * 1024);

        assert!(Config::new("secret")
            .unwrap()
            .with_body_limit("huge")
            .is_err());
    }
}
