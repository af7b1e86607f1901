use chrono::Duration;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:8001";
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
pub const DEFAULT_OTP_TTL_MINUTES: i64 = 10;

/// How long credentials stay valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthConfig {
    pub session_ttl: Duration,
    pub otp_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            otp_ttl: Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// RocksDB directory; `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8001))),
            db_path: None,
            auth: AuthConfig::default(),
        }
    }
}
