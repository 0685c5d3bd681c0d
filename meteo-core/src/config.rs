use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    error::{MeteoError, Result},
    resolver::ResolverId,
};

pub const DEFAULT_USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_GEONAMES_BASE_URL: &str = "http://api.geonames.org";
pub const DEFAULT_MET_BASE_URL: &str = "https://api.met.no";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_ROWS: u32 = 10;

/// HTTP-level settings shared by the resolver and the forecast fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub user_agent: String,
    pub timeout: Duration,
    pub geonames_base_url: String,
    pub met_base_url: String,
    /// Upper bound on candidates requested from the Wikipedia search.
    pub max_rows: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            geonames_base_url: DEFAULT_GEONAMES_BASE_URL.to_string(),
            met_base_url: DEFAULT_MET_BASE_URL.to_string(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl ClientOptions {
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(MeteoError::Config("user agent must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(MeteoError::Config("timeout must be greater than zero".into()));
        }
        if self.max_rows == 0 {
            return Err(MeteoError::Config("max rows must be greater than zero".into()));
        }
        let base_urls = [
            ("GeoNames", &self.geonames_base_url),
            ("MET Norway", &self.met_base_url),
        ];
        for (name, url) in base_urls {
            Url::parse(url).map_err(|e| {
                MeteoError::Config(format!("invalid {name} base URL {url:?}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Validate the options and build the HTTP client every request goes through.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        self.validate()?;

        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()
            .map_err(|e| MeteoError::Config(format!("building HTTP client: {e}")))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geonames_username = "alice"
/// default_resolver = "postal"
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Account name registered with GeoNames.org.
    pub geonames_username: Option<String>,

    /// Resolver id, "postal" or "wikipedia". Postal when absent.
    pub default_resolver: Option<String>,

    pub timeout_secs: Option<u64>,
    pub geonames_base_url: Option<String>,
    pub met_base_url: Option<String>,
}

impl Config {
    pub fn resolver_id(&self) -> Result<ResolverId> {
        match self.default_resolver.as_deref() {
            Some(id) => ResolverId::try_from(id),
            None => Ok(ResolverId::Postal),
        }
    }

    /// Username with surrounding whitespace removed; `None` if unset or blank.
    pub fn username(&self) -> Option<&str> {
        self.geonames_username.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn set_username(&mut self, username: String) {
        self.geonames_username = Some(username);
    }

    pub fn set_default_resolver(&mut self, id: ResolverId) {
        self.default_resolver = Some(id.as_str().to_string());
    }

    /// Defaults overlaid with whatever this config overrides.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default();
        if let Some(secs) = self.timeout_secs {
            options.timeout = Duration::from_secs(secs);
        }
        if let Some(url) = &self.geonames_base_url {
            options.geonames_base_url = url.clone();
        }
        if let Some(url) = &self.met_base_url {
            options.met_base_url = url.clone();
        }
        options
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    pub fn config_file_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo", "meteo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
