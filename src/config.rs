use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_LOG_FILTER: &str = "quiz_adaptive_backend=info,tower_http=info";
pub const DEFAULT_ROUTE_PREFIX: &str = "/rl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite(String),
}

/// Rolling file output next to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub dir: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub file: Option<LogFile>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log: LogConfig,
    pub store: StoreBackend,
    pub rng_seed: Option<u64>,
    /// Second mount point for the quiz routes; `None` mounts them at the root only.
    pub route_prefix: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = lookup("HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let store = match lookup("QUIZ_DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => StoreBackend::Sqlite(url.trim().to_string()),
            _ => StoreBackend::Memory,
        };

        let rng_seed = lookup("QUIZ_RNG_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        let route_prefix = normalize_mount_point(
            lookup("QUIZ_ROUTE_PREFIX")
                .as_deref()
                .unwrap_or(DEFAULT_ROUTE_PREFIX),
        );

        Self {
            host,
            port,
            log: LogConfig::from_lookup(&lookup),
            store,
            rng_seed,
            route_prefix,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl LogConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup("RUST_LOG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let file_enabled = lookup("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let file = file_enabled.then(|| LogFile {
            dir: lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string()),
            file_name: lookup("QUIZ_LOG_FILE").unwrap_or_else(|| "quiz.log".to_string()),
        });

        Self { filter, file }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            file: None,
        }
    }
}

/// `None` when the alias would collide with the root mount.
pub fn normalize_mount_point(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}
