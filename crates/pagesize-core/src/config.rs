use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Pages fetched when the config file does not override `targets`.
pub const DEFAULT_TARGETS: &[&str] = &[
    "yahoo.com",
    "google.com",
    "bing.com",
    "amazon.com",
    "github.com",
    "gitlab.com",
];

/// HTTP transport parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Upper bound in seconds for one whole request, body included.
    pub request_timeout_secs: u64,
    /// Treat non-2xx responses as failed fetches instead of counting their body.
    #[serde(default)]
    pub fail_on_http_error: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            fail_on_http_error: false,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/pagesize/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesizeConfig {
    /// Number of concurrent fetch workers.
    pub workers: usize,
    /// Slots in the task queue between the producer and the workers.
    pub queue_capacity: usize,
    /// Resource identifiers to fetch, in enqueue order.
    pub targets: Vec<String>,
    /// Optional HTTP settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for PagesizeConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 2,
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            http: None,
        }
    }
}

impl PagesizeConfig {
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    /// Reject values that would make the run meaningless before anything is spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pool(self.workers, self.queue_capacity)?;
        let http = self.http();
        if http.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroHttpTimeout {
                field: "connect_timeout_secs",
            });
        }
        if http.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroHttpTimeout {
                field: "request_timeout_secs",
            });
        }
        Ok(())
    }
}

/// Worker count and queue capacity must both be at least one.
pub fn validate_pool(workers: usize, queue_capacity: usize) -> Result<(), ConfigError> {
    if workers == 0 {
        return Err(ConfigError::ZeroWorkers);
    }
    if queue_capacity == 0 {
        return Err(ConfigError::ZeroQueueCapacity);
    }
    Ok(())
}

/// Global run deadline. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTimeout(Duration);

impl RunTimeout {
    pub fn new(duration: Duration) -> Result<Self, ConfigError> {
        if duration.is_zero() {
            return Err(ConfigError::NonPositiveTimeout {
                value: format!("{:?}", duration),
            });
        }
        Ok(Self(duration))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

/// Parse the command-line timeout: a positive whole number of seconds.
pub fn parse_timeout(raw: &str) -> Result<RunTimeout, ConfigError> {
    let trimmed = raw.trim();
    let secs: i64 = trimmed.parse().map_err(|_| ConfigError::InvalidTimeout {
        value: raw.to_string(),
    })?;
    if secs < 1 {
        return Err(ConfigError::NonPositiveTimeout {
            value: trimmed.to_string(),
        });
    }
    RunTimeout::new(Duration::from_secs(secs as u64))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagesize")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PagesizeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PagesizeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing file is an error.
pub fn load_from_path(path: &Path) -> Result<PagesizeConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: PagesizeConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
