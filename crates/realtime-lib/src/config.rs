// ============================
// crates/realtime-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// HMAC secret used to verify bearer tokens
    pub jwt_secret: String,
    /// Lifetime of tokens issued by the demo/test issuer, in seconds
    pub token_ttl_secs: u64,
    /// Log level
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            jwt_secret: "your-secret-key".to_string(),
            token_ttl_secs: 60 * 60 * 24, // 1 day
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `HRMS_`-prefixed environment
    /// variables, falling back to defaults for anything unset.
    pub fn load() -> Result<Self> {
        let settings = Figment::from(figment::providers::Serialized::defaults(
            SettingsDefaults::default(),
        ))
        .merge(Toml::file("config.toml"))
        .merge(Env::prefixed("HRMS_"))
        .extract()?;

        Ok(settings)
    }

    /// Load settings from an explicit TOML file path.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::from(figment::providers::Serialized::defaults(
            SettingsDefaults::default(),
        ))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HRMS_"))
        .extract()?;

        Ok(settings)
    }
}

/// Serializable mirror of [`Settings`] defaults for figment layering.
#[derive(Debug, serde::Serialize)]
struct SettingsDefaults {
    bind_addr: SocketAddr,
    jwt_secret: String,
    token_ttl_secs: u64,
    log_level: String,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        let s = Settings::default();
        Self {
            bind_addr: s.bind_addr,
            jwt_secret: s.jwt_secret,
            token_ttl_secs: s.token_ttl_secs,
            log_level: s.log_level,
        }
    }
}
