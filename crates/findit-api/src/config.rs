//! Application configuration loaded from environment variables.
//!
//! Every setting has a default so the server starts with zero configuration
//! for local development.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tracing::warn;

/// Secret used when `FINDIT_SECRET_KEY` is unset. Fine for development only.
pub const DEV_SECRET_KEY: &str = "dev-secret-key";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Signs session cookies.
    /// Env: `FINDIT_SECRET_KEY`
    pub secret_key: String,

    /// Env: `FINDIT_HOST`
    pub host: IpAddr,

    /// Env: `FINDIT_PORT`, falling back to `PORT`
    pub port: u16,

    /// Env: `FINDIT_DB_PATH`
    pub db_path: PathBuf,

    /// Public assets served under `/static/`.
    /// Env: `FINDIT_STATIC_DIR`
    pub static_dir: PathBuf,

    /// Uploaded item photos, served under `/static/uploads/`.
    /// Env: `FINDIT_UPLOAD_DIR`
    pub upload_dir: PathBuf,

    /// Insert demo listings into an empty database at startup.
    /// Env: `FINDIT_SEED_SAMPLES` (true/false)
    pub seed_samples: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            db_path: PathBuf::from("lostfound.db"),
            static_dir: PathBuf::from("static"),
            upload_dir: PathBuf::from("static/uploads"),
            seed_samples: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secret) = lookup("FINDIT_SECRET_KEY").filter(|s| !s.is_empty()) {
            config.secret_key = secret;
        }

        if let Some(host) = lookup("FINDIT_HOST") {
            match host.parse() {
                Ok(parsed) => config.host = parsed,
                Err(_) => warn!(value = %host, "Invalid FINDIT_HOST, using default"),
            }
        }

        if let Some(port) = lookup("FINDIT_PORT").or_else(|| lookup("PORT")) {
            match port.parse() {
                Ok(parsed) => config.port = parsed,
                Err(_) => warn!(value = %port, "Invalid port, using default"),
            }
        }

        if let Some(path) = lookup("FINDIT_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("FINDIT_STATIC_DIR") {
            config.static_dir = PathBuf::from(path);
        }

        if let Some(path) = lookup("FINDIT_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(path);
        }

        if let Some(val) = lookup("FINDIT_SEED_SAMPLES") {
            config.seed_samples = val != "false" && val != "0";
        }

        config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}
