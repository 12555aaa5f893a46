use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fetch::places::DEFAULT_PLACES_ENDPOINT;
use crate::fetch::wikipedia::DEFAULT_WIKIPEDIA_ENDPOINT;
use crate::place::DEFAULT_MAX_WIDTH;
use crate::resolver::DEFAULT_LANGUAGES;
use crate::validate::UrlPolicy;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BUCKET: &str = "place-photos";

/// `jelajah.toml`. Every key is optional; missing services disable their tier.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct JelajahConfig {
    pub database: Option<String>,
    pub places: PlacesConfig,
    pub proxy: ProxyConfig,
    pub storage: StorageConfig,
    pub wikipedia: WikipediaConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Remote proxy deployment. When unset, `serve` delegates in-process.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: Option<String>,
    pub bucket: Option<String>,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WikipediaConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub languages: Option<Vec<String>>,
}

/// Extra URL signatures on top of the built-in lists
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub accepted_signatures: Vec<String>,
    pub legacy_signatures: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub max_width: Option<u32>,
    pub single_flight: Option<bool>,
}

impl JelajahConfig {
    /// Starter config written by `jelajah init`
    pub fn starter() -> Self {
        Self {
            database: Some(default_database_path().to_string_lossy().to_string()),
            places: PlacesConfig {
                api_key: None,
                endpoint: Some(DEFAULT_PLACES_ENDPOINT.to_string()),
            },
            storage: StorageConfig {
                dir: Some(".jelajah/objects".to_string()),
                bucket: Some(DEFAULT_BUCKET.to_string()),
                public_base_url: Some(format!("http://localhost:{}", DEFAULT_PORT)),
            },
            wikipedia: WikipediaConfig {
                enabled: Some(true),
                endpoint: Some(DEFAULT_WIKIPEDIA_ENDPOINT.to_string()),
                languages: Some(DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect()),
            },
            server: ServerConfig {
                port: Some(DEFAULT_PORT),
            },
            resolver: ResolverConfig {
                max_width: Some(DEFAULT_MAX_WIDTH),
                single_flight: Some(false),
            },
            ..Default::default()
        }
    }

    /// Override secrets and endpoints from the environment
    pub fn apply_env(&mut self) {
        if let Some(key) = env_var("JELAJAH_PLACES_API_KEY").or_else(|| env_var("GOOGLE_PLACES_API_KEY")) {
            tracing::debug!("Places API key taken from environment");
            self.places.api_key = Some(key);
        }
        if let Some(url) = env_var("JELAJAH_PROXY_URL") {
            tracing::debug!("Proxy URL taken from environment: {}", url);
            self.proxy.url = Some(url);
        }
        if let Some(token) = env_var("JELAJAH_PROXY_TOKEN") {
            self.proxy.token = Some(token);
        }
        if let Some(base) = env_var("JELAJAH_PUBLIC_BASE_URL") {
            tracing::debug!("Public base URL taken from environment: {}", base);
            self.storage.public_base_url = Some(base);
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn max_width(&self) -> u32 {
        self.resolver.max_width.unwrap_or(DEFAULT_MAX_WIDTH)
    }

    pub fn single_flight(&self) -> bool {
        self.resolver.single_flight.unwrap_or(false)
    }

    pub fn places_api_key(&self) -> Option<&str> {
        self.places.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Bearer token shared between the proxy and its callers
    pub fn proxy_token(&self) -> Option<&str> {
        self.proxy.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn places_endpoint(&self) -> &str {
        self.places.endpoint.as_deref().unwrap_or(DEFAULT_PLACES_ENDPOINT)
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".jelajah").join("objects"))
    }

    pub fn bucket(&self) -> &str {
        self.storage.bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }

    pub fn public_base_url(&self) -> String {
        self.storage
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port()))
    }

    pub fn wikipedia_enabled(&self) -> bool {
        self.wikipedia.enabled.unwrap_or(true)
    }

    pub fn wikipedia_endpoint(&self) -> &str {
        self.wikipedia.endpoint.as_deref().unwrap_or(DEFAULT_WIKIPEDIA_ENDPOINT)
    }

    pub fn languages(&self) -> Vec<String> {
        self.wikipedia
            .languages
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }

    pub fn url_policy(&self) -> UrlPolicy {
        UrlPolicy::with_extra(&self.cache.accepted_signatures, &self.cache.legacy_signatures)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("jelajah.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from(".jelajah").join("photos.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<JelajahConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: JelajahConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Config file (or defaults) with environment overrides applied
pub fn resolve_config(path: Option<&Path>) -> anyhow::Result<JelajahConfig> {
    let mut config = match load_config(path)? {
        Some(config) => config,
        None => {
            tracing::debug!("No config file found, using defaults");
            JelajahConfig::default()
        }
    };
    config.apply_env();
    Ok(config)
}

pub fn write_config(path: &Path, config: &JelajahConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
