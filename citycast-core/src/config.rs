use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://weather.lewagon.com";
pub const DEFAULT_GEOCODE_LIMIT: u8 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound the geocoding endpoint accepts for `limit`.
const MAX_GEOCODE_LIMIT: u8 = 5;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "https://api.openweathermap.org"
/// api_key = "..."
/// units = "metric"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of both the geocoding and the forecast endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `appid` when present. The default proxy needs none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sent as `units` when present (`metric`, `imperial`, `standard`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    /// How many candidates a city search asks for.
    #[serde(default = "default_geocode_limit")]
    pub geocode_limit: u8,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_geocode_limit() -> u8 {
    DEFAULT_GEOCODE_LIMIT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            units: None,
            geocode_limit: default_geocode_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Settings for one run: the stored file (if any), then the command-line
    /// overrides, checked as a whole.
    pub fn load(base_url: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path, base_url, timeout_secs)
    }

    pub fn load_from(
        path: &Path,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let cfg = Self::read_from(path)?.with_overrides(base_url, timeout_secs);
        cfg.validate()
            .with_context(|| format!("Invalid configuration (file: {})", path.display()))?;
        debug!(base_url = %cfg.base_url, timeout_secs = cfg.timeout_secs, "configuration loaded");
        Ok(cfg)
    }

    /// Stored settings as they are, for editing. A missing file reads as defaults.
    pub fn stored() -> Result<Self> {
        Self::read_from(&Self::config_file_path()?)
    }

    fn read_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write to the platform config file and return where it went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Only valid settings are written, so `load` never trips over our own output.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate().context("Refusing to save invalid configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "citycast", "citycast")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Apply one-off overrides from the command line.
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    /// Parsed base URL, without a trailing slash.
    pub fn base_url(&self) -> Result<Url> {
        let trimmed = self.base_url.trim_end_matches('/');
        let url = Url::parse(trimmed)
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            bail!("Base URL '{}' must use http or https", self.base_url);
        }

        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject values the HTTP layer cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if !(1..=MAX_GEOCODE_LIMIT).contains(&self.geocode_limit) {
            bail!(
                "geocode_limit must be between 1 and {MAX_GEOCODE_LIMIT}, got {}",
                self.geocode_limit
            );
        }

        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }
}
