//! Configuration management for the gate.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use captcha_common::constants::{
    DEFAULT_AUTHORITY_TIMEOUT_SECS, DEFAULT_CHALLENGE_URL, DEFAULT_LISTEN_ADDR,
    DEFAULT_NOSCRIPT_URL, DEFAULT_SESSION_TTL_SECS, DEFAULT_VERIFY_URL,
};
use captcha_session::AuthorityEndpoints;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Site key embedded in the widget
    #[serde(default)]
    pub public_key: String,

    /// Secret key sent to the authority
    #[serde(default)]
    pub private_key: String,

    /// Lifetime of an unverified session in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Verification authority configuration
    #[serde(default)]
    pub authority: AuthorityConfig,
}

/// Verification authority configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityConfig {
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    #[serde(default = "default_challenge_url")]
    pub challenge_url: String,

    #[serde(default = "default_noscript_url")]
    pub noscript_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            verify_url: default_verify_url(),
            challenge_url: default_challenge_url(),
            noscript_url: default_noscript_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl AuthorityConfig {
    pub fn endpoints(&self) -> AuthorityEndpoints {
        AuthorityEndpoints {
            verify_url: self.verify_url.clone(),
            challenge_url: self.challenge_url.clone(),
            noscript_url: self.noscript_url.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_session_ttl() -> u64 { DEFAULT_SESSION_TTL_SECS }
fn default_verify_url() -> String { DEFAULT_VERIFY_URL.to_string() }
fn default_challenge_url() -> String { DEFAULT_CHALLENGE_URL.to_string() }
fn default_noscript_url() -> String { DEFAULT_NOSCRIPT_URL.to_string() }
fn default_timeout() -> u64 { DEFAULT_AUTHORITY_TIMEOUT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref public_key) = args.public_key {
            config.public_key = public_key.clone();
        }
        if let Some(ref private_key) = args.private_key {
            config.private_key = private_key.clone();
        }
        if let Some(ref verify_url) = args.verify_url {
            config.authority.verify_url = verify_url.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.public_key.is_empty() {
            bail!("public_key is not set (config file, --public-key or CAPTCHA_PUBLIC_KEY)");
        }
        if self.private_key.is_empty() {
            bail!("private_key is not set (config file, --private-key or CAPTCHA_PRIVATE_KEY)");
        }
        if self.authority.timeout_secs == 0 {
            bail!("authority.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            public_key: String::new(),
            private_key: String::new(),
            session_ttl_secs: default_session_ttl(),
            authority: AuthorityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.authority.endpoints(), AuthorityEndpoints::default());
        assert_eq!(config.authority.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_keys_are_required() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.public_key = "pub".into();
        config.private_key = "priv".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                public_key = "pub"
                private_key = "priv"

                [authority]
                verify_url = "http://127.0.0.1:9000/verify"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.authority.verify_url, "http://127.0.0.1:9000/verify");
        assert_eq!(config.authority.challenge_url, DEFAULT_CHALLENGE_URL);
        assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert!(config.validate().is_ok());
    }
}
