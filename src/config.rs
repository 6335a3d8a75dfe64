use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "NailedIt";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Inbox page size when the client does not ask for one.
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 50;
/// Upper bound on any inbox page.
pub const MAX_NOTIFICATION_LIMIT: u32 = 200;
/// Reference client polling interval for the unread badge.
pub const NOTIFICATION_POLL_INTERVAL_SECS: u64 = 30;

pub const DEFAULT_PORT: u16 = 5000;
const FALLBACK_JWT_SECRET: &str = "no_jwt_secret_set";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,nailedit_lib=debug,tower_http=info"
}

/// Get the application data directory (~/NailedIt/).
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("nailedit.db")
}

/// Runtime settings for the HTTP server, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Load `.env` if present, then read `BIND_ADDR`, `PORT`, `DB_PATH` and
    /// `JWT_SECRET`. Unparseable values fall back to defaults with a warning.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ip = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse::<IpAddr>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid BIND_ADDR, using 0.0.0.0");
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            }),
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let db_path = lookup("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set; tokens are signed with an insecure fallback");
                FALLBACK_JWT_SECRET.to_string()
            });

        Self {
            bind: SocketAddr::new(ip, port),
            db_path,
            jwt_secret,
        }
    }
}
