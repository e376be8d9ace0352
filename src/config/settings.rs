//! Application settings from coinvault.toml and environment variables.
//!
//! The TOML file carries deployment-neutral values (bind address, oracle URL);
//! secrets come exclusively from the environment. `ADMIN_JWT_SECRET` has no
//! default and no fallback: startup fails without it.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional values read from coinvault.toml
#[derive(Debug, Deserialize, Default)]
struct FileSettings {
    database_url: Option<String>,
    bind_addr: Option<String>,
    coingecko_url: Option<String>,
}

/// Fully-resolved application settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// SeaORM database URL
    pub database_url: String,
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Base URL of the CoinGecko-compatible price feed
    pub coingecko_url: String,
    /// HS256 signing secret for admin tokens; required, never defaulted
    pub admin_jwt_secret: String,
    /// Email the admin console logs in with
    pub admin_email: String,
    /// Password the admin console logs in with
    pub admin_password: String,
}

impl Settings {
    /// Loads settings from the default location (./coinvault.toml), which may
    /// be absent, plus the environment.
    ///
    /// # Errors
    /// Returns a configuration error if a required secret is missing or the
    /// TOML file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from("coinvault.toml")
    }

    /// Loads settings from an explicit TOML path plus the environment.
    /// Environment variables override file values.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = if path.as_ref().exists() {
            let contents = std::fs::read_to_string(path.as_ref())?;
            toml::from_str::<FileSettings>(&contents).map_err(|e| Error::Config {
                message: format!("Failed to parse {}: {e}", path.as_ref().display()),
            })?
        } else {
            FileSettings::default()
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .or(file.database_url)
            .unwrap_or_else(|| "sqlite://data/coinvault.sqlite?mode=rwc".to_string());

        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .or(file.bind_addr)
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let coingecko_url = std::env::var("COINGECKO_URL")
            .ok()
            .or(file.coingecko_url)
            .unwrap_or_else(|| "https://api.coingecko.com".to_string());

        let admin_jwt_secret = required_env("ADMIN_JWT_SECRET")?;
        let admin_email = required_env("ADMIN_EMAIL")?;
        let admin_password = required_env("ADMIN_PASSWORD")?;

        Ok(Self {
            database_url,
            bind_addr,
            coingecko_url,
            admin_jwt_secret,
            admin_email,
            admin_password,
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("{name} must be set"),
        }),
    }
}
