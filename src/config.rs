//! Process configuration loaded from environment variables.
//!
//! Built once at startup and passed by reference to whatever constructs
//! the executor. Absent or unparseable variables fall back to defaults.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HOST` | `localhost` | Listen host |
//! | `PORT` | `18000` | Listen port |
//! | `LEXNEO4J_LOG_LEVEL` | `info` | tracing filter (trace/debug/info/warn/error or directives) |
//! | `LEXNEO4J_LOG_FORMAT` | `json` | `text` or `json` |
//! | `LEXNEO4J_MIDDLEWARE_VERBOSE_LOGGER_ENABLED` | `true` | Per-request logging |
//! | `LEXNEO4J_MIDDLEWARE_VERBOSE_LOGGER_EXCLUDE_URLS` | (empty) | Comma-separated paths left out of request logging |
//! | `LEXNEO4J_MIDDLEWARE_GZIP_ENABLED` | `true` | Response compression |
//! | `NEO4J_URL` | `bolt://neo4j:7687/neo4j` | Database URL |
//! | `NEO4J_USERNAME` | `neo4j` | Database user |
//! | `NEO4J_PASSWORD` | `password` | Database password |

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Database driver settings handed to the executor implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub max_connection_lifetime: Duration,
    pub max_connection_pool_size: usize,
    pub connection_acquisition_timeout: Duration,
    pub socket_keepalive: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            url: "bolt://neo4j:7687/neo4j".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            max_connection_lifetime: Duration::from_secs(60),
            max_connection_pool_size: 10,
            connection_acquisition_timeout: Duration::from_secs(60),
            socket_keepalive: true,
        }
    }
}

/// Runtime configuration for the service process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// Tracing filter string, e.g. `"lexneo4j=debug,info"`.
    pub log_level: String,
    pub log_format: LogFormat,

    pub verbose_logger_enabled: bool,
    pub verbose_logger_exclude_urls: Vec<String>,
    pub gzip_enabled: bool,

    pub neo4j: DriverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 18000,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            verbose_logger_enabled: true,
            verbose_logger_exclude_urls: Vec::new(),
            gzip_enabled: true,
            neo4j: DriverConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Config::default();
        let str_or = |key: &str, default: String| lookup(key).unwrap_or(default);
        let parse_or = |key: &str, default| lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default);

        Self {
            host:      str_or("HOST", d.host),
            port:      lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(d.port),
            log_level: str_or("LEXNEO4J_LOG_LEVEL", d.log_level),
            log_format: lookup("LEXNEO4J_LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.log_format),
            verbose_logger_enabled: parse_or("LEXNEO4J_MIDDLEWARE_VERBOSE_LOGGER_ENABLED", d.verbose_logger_enabled),
            verbose_logger_exclude_urls: lookup("LEXNEO4J_MIDDLEWARE_VERBOSE_LOGGER_EXCLUDE_URLS")
                .map(|v| split_list(&v))
                .unwrap_or(d.verbose_logger_exclude_urls),
            gzip_enabled: parse_or("LEXNEO4J_MIDDLEWARE_GZIP_ENABLED", d.gzip_enabled),
            neo4j: DriverConfig {
                url:      str_or("NEO4J_URL", d.neo4j.url),
                username: str_or("NEO4J_USERNAME", d.neo4j.username),
                password: str_or("NEO4J_PASSWORD", d.neo4j.password),
                ..d.neo4j
            },
        }
    }

    /// `host:port` for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Install the global tracing subscriber. Returns `false` if one was
    /// already installed.
    pub fn init_tracing(&self) -> bool {
        let filter = EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match self.log_format {
            LogFormat::Json => builder.json().try_init().is_ok(),
            LogFormat::Text => builder.try_init().is_ok(),
        };
        if installed {
            tracing::info!(level = %self.log_level, format = ?self.log_format, "tracing initialised");
        }
        installed
    }
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
