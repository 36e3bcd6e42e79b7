//! Server configuration loaded from environment variables (and `.env`).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Env: `PINBOARD_JWT_SECRET` (required, not a placeholder)
    pub jwt_secret: String,

    /// Env: `PINBOARD_DB_PATH`, default `pinboard.db`
    pub db_path: PathBuf,

    /// Env: `PINBOARD_HOST` / `PINBOARD_PORT`, default `0.0.0.0:5000`
    pub addr: SocketAddr,

    /// Allowed browser origin. Env: `PINBOARD_CORS_ORIGIN`, default
    /// `http://localhost:3000`; `*` allows any origin.
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("PINBOARD_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PINBOARD_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = lookup("PINBOARD_DB_PATH")
            .unwrap_or_else(|| "pinboard.db".into())
            .into();
        let host = lookup("PINBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("PINBOARD_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("PINBOARD_PORT must be a port number")?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .context("PINBOARD_HOST must be an IP address")?;
        let cors_origin =
            lookup("PINBOARD_CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into());

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            cors_origin,
        })
    }
}
