//! Server configuration.
//!
//! Every option can come from the command line or the environment; `main`
//! loads a `.env` file first so local setups only need that file.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Church administration back office server
#[derive(Parser, Debug, Clone)]
#[command(name = "church-admin")]
#[command(about = "REST back office for church membership, schools and certificates")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,

    /// SQLite connection string; the file is created when missing
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:church_admin.db")]
    pub database_url: String,

    /// Directory holding `uploads/` (member photos and certificates)
    #[arg(long, env = "WEB_ROOT", default_value = "wwwroot")]
    pub web_root: PathBuf,

    /// Built admin UI, served for any path the API does not handle
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// JWT signing secret (required outside dev mode, at least 32 characters)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "28800")]
    pub jwt_expiry_seconds: u64,

    #[arg(long, env = "JWT_ISSUER", default_value = "church-admin")]
    pub jwt_issuer: String,

    #[arg(long, env = "JWT_AUDIENCE", default_value = "church-admin-ui")]
    pub jwt_audience: String,

    /// Comma separated CORS origins; empty allows any origin
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Development mode (falls back to a built-in JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Admin account created on first start
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@igreja.com")]
    pub admin_email: String,

    #[arg(long, env = "ADMIN_PASSWORD", default_value = "Admin@123")]
    pub admin_password: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,
}

impl Config {
    /// Secret to sign tokens with, `None` when unset or blank
    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
    }

    /// Origins with blanks dropped, so `ALLOWED_ORIGINS=` means any origin
    pub fn origins(&self) -> Vec<&str> {
        self.allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.web_root.join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_overrides_defaults() {
        let config = Config::parse_from([
            "church-admin",
            "--web-root",
            "/srv/igreja",
            "--allowed-origins",
            "https://admin.igreja.org, https://igreja.org",
            "--dev-mode",
            "--jwt-secret",
            "  ",
        ]);

        assert_eq!(config.web_root, PathBuf::from("/srv/igreja"));
        assert_eq!(config.uploads_dir(), PathBuf::from("/srv/igreja/uploads"));
        assert_eq!(config.origins(), vec!["https://admin.igreja.org", "https://igreja.org"]);
        assert!(config.dev_mode);
        assert_eq!(config.jwt_secret(), None);
    }
}
