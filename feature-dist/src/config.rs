use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::series::SeriesIds;

const DEFAULT_SOCKET: &str = "/tmp/dataset-api.sock";
const DEFAULT_LOG_FILE: &str = "/tmp/feature-dist.log";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHART_HEIGHT: u16 = 24;

/// How to reach the dataset API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiAddr {
    Unix(PathBuf),
    Tcp(String),
}

impl std::fmt::Display for ApiAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAddr::Unix(path) => write!(f, "unix:{}", path.display()),
            ApiAddr::Tcp(host) => write!(f, "tcp:{}", host),
        }
    }
}

/// Runtime settings, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_addr: ApiAddr,
    /// Socket read timeout, and how long a fetch may stay outstanding.
    pub timeout: Duration,
    /// Drop completions from superseded requests instead of letting the
    /// last one to arrive win.
    pub discard_stale: bool,
    pub series_ids: SeriesIds,
    pub chart_height: u16,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_addr: ApiAddr::Unix(PathBuf::from(DEFAULT_SOCKET)),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            discard_stale: false,
            series_ids: SeriesIds::PerFeature,
            chart_height: DEFAULT_CHART_HEIGHT,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        // TCP port wins over host, host wins over socket
        if let Some(port) = lookup("DATASET_API_TCP_PORT") {
            let p = parse_num::<u16>("DATASET_API_TCP_PORT", "a port number", &port)?;
            cfg.api_addr = ApiAddr::Tcp(format!("127.0.0.1:{}", p));
        } else if let Some(host) = lookup("DATASET_API_HOST") {
            cfg.api_addr = ApiAddr::Tcp(host);
        } else if let Some(sock) = lookup("DATASET_API_SOCKET") {
            cfg.api_addr = ApiAddr::Unix(PathBuf::from(sock));
        }

        if let Some(secs) = lookup("DATASET_API_TIMEOUT_SECS") {
            let s = parse_num::<u64>("DATASET_API_TIMEOUT_SECS", "seconds", &secs)?;
            cfg.timeout = Duration::from_secs(s.max(1));
        }

        if let Some(v) = lookup("FEATURE_DIST_DISCARD_STALE") {
            cfg.discard_stale = parse_flag("FEATURE_DIST_DISCARD_STALE", &v)?;
        }

        if let Some(v) = lookup("FEATURE_DIST_QUALIFIED_IDS") {
            if parse_flag("FEATURE_DIST_QUALIFIED_IDS", &v)? {
                cfg.series_ids = SeriesIds::Qualified;
            }
        }

        if let Some(h) = lookup("FEATURE_DIST_CHART_HEIGHT") {
            cfg.chart_height = parse_num::<u16>("FEATURE_DIST_CHART_HEIGHT", "a row count", &h)?;
        }

        if let Some(path) = lookup("FEATURE_DIST_LOG") {
            cfg.log_file = PathBuf::from(path);
        }

        Ok(cfg)
    }
}

fn parse_num<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            expected: "a boolean",
            value: value.to_string(),
        }),
    }
}
