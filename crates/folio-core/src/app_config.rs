use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub platforms_path: PathBuf,
    /// Per-request timeout for statistics endpoints. `0` means unbounded.
    pub stats_request_timeout_secs: u64,
    pub stats_connect_timeout_secs: u64,
    pub stats_user_agent: String,
    /// Cron expression for the scheduled refresh; `None` disables it.
    pub refresh_cron: Option<String>,
    pub api_keys: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("platforms_path", &self.platforms_path)
            .field(
                "stats_request_timeout_secs",
                &self.stats_request_timeout_secs,
            )
            .field(
                "stats_connect_timeout_secs",
                &self.stats_connect_timeout_secs,
            )
            .field("stats_user_agent", &self.stats_user_agent)
            .field("refresh_cron", &self.refresh_cron)
            .field("api_keys", &self.api_keys.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}
