use std::time::Duration;

use bookcat_app::state::AppConfig;
use bookcat_types::config::BackendConfig;
pub use clap::Parser;

use crate::error::Result;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "BOOKCAT_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "BOOKCAT_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "BOOKCAT_PAGE_SIZE",
        default_value = "6",
        help = "Number of books on one catalogue page",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub page_size: u32,

    #[arg(
        long,
        env = "BOOKCAT_SESSION_EXPIRY",
        default_value = "14 days",
        help = "Session expires after this period of inactivity, in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub session_expiry: Duration,

    #[arg(
        long,
        env = "BOOKCAT_SECURE_COOKIES",
        help = "Send session cookie only over HTTPS"
    )]
    pub secure_cookies: bool,
}

impl ServerConfig {
    pub fn database_url(&self) -> String {
        self.backend.database_url()
    }

    pub fn session_expiry(&self) -> Result<time::Duration> {
        time::Duration::try_from(self.session_expiry).map_err(|e| e.into())
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            page_size: config.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config =
            ServerConfig::try_parse_from(["bookcat-server", "--data-dir", "/tmp/bookcat"]).unwrap();
        assert_eq!(config.page_size, 6);
        assert_eq!(config.session_expiry, Duration::from_secs(14 * 24 * 3600));
        assert_eq!(config.session_expiry().unwrap(), time::Duration::days(14));
        assert!(!config.secure_cookies);
        assert_eq!(config.database_url(), "sqlite:///tmp/bookcat/bookcat.db");
    }

    #[test]
    fn test_invalid_page_size() {
        let res = ServerConfig::try_parse_from(["bookcat-server", "--page-size", "0"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_session_expiry() {
        let config = ServerConfig::try_parse_from([
            "bookcat-server",
            "--data-dir",
            "/tmp/bookcat",
            "--session-expiry",
            "1h 30m",
        ])
        .unwrap();
        assert_eq!(config.session_expiry().unwrap(), time::Duration::minutes(90));
    }
}
