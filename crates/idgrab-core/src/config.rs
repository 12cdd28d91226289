use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration loaded from `~/.config/idgrab/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Download endpoint without query string (e.g. `https://host/index.php`).
    pub base_url: String,
    /// Value of the `route` query parameter.
    pub route: String,
    /// First download ID (inclusive).
    pub start_id: u64,
    /// Last download ID (inclusive).
    pub end_id: u64,
    /// Maximum number of requests in flight at once.
    pub concurrency: usize,
    /// Directory the downloaded files are written to.
    pub output_dir: PathBuf,
    /// Total time allowed for one request, body included.
    pub request_timeout_secs: u64,
    /// Pause between dispatching consecutive IDs (0 = no pacing).
    pub dispatch_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://shop.iflight.com/index.php".to_string(),
            route: "product/product/download".to_string(),
            start_id: 0,
            end_id: 100_000,
            concurrency: 8,
            output_dir: PathBuf::from("assets"),
            request_timeout_secs: 60,
            dispatch_delay_ms: 0,
        }
    }
}

impl FetchConfig {
    /// Rejects settings the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.start_id > self.end_id {
            anyhow::bail!(
                "start_id ({}) must not be greater than end_id ({})",
                self.start_id,
                self.end_id
            );
        }
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.concurrency > tokio::sync::Semaphore::MAX_PERMITS {
            anyhow::bail!("concurrency {} is too large", self.concurrency);
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("output_dir must not be empty");
        }
        url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url: {}", self.base_url))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dispatch_delay(&self) -> Option<Duration> {
        (self.dispatch_delay_ms > 0).then(|| Duration::from_millis(self.dispatch_delay_ms))
    }

    /// Number of IDs in the inclusive range.
    pub fn id_count(&self) -> u64 {
        self.end_id.saturating_sub(self.start_id).saturating_add(1)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("idgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
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

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
