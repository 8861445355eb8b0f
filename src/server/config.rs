//! Configuration loading for kapowd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.kapow/config.toml` (user)
//! 3. `/etc/kapow/config.toml` (system)
//!
//! With no file at all, built-in defaults are used.
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.kapow/secrets.toml` (user, must be 0600)
//! 2. `/etc/kapow/secrets.toml` (system, must be 0600)
//! 3. `KAPOW_API_KEY` environment variable

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::cache::CacheConfig;
use crate::engine::ImageSource;
use crate::providers::kapow_api::{DEFAULT_BASE_URL, DEFAULT_IMAGE_SOURCE};
use crate::types::{
    DEFAULT_MIN_TOPIC_SCORE, DEFAULT_PER_PAGE, DEFAULT_THRESHOLD, Settings,
};
use crate::{KapowError, Result};

/// Environment variable consulted when no secrets file provides a key.
pub const API_KEY_ENV_VAR: &str = "KAPOW_API_KEY";

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:9742).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:9742".to_string()
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 45).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Image provider name sent to the lookup endpoint (default: Unsplash).
    #[serde(default = "default_image_source")]
    pub image_source: String,
    /// Provider homepage linked from attributions.
    #[serde(default = "default_image_source_url")]
    pub image_source_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            image_source: default_image_source(),
            image_source_url: default_image_source_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    45
}

fn default_image_source() -> String {
    DEFAULT_IMAGE_SOURCE.to_string()
}

fn default_image_source_url() -> String {
    "https://unsplash.com/".to_string()
}

/// Initial model parameters. Out-of-range values are clamped.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_topic_score")]
    pub min_topic_score: f64,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_topic_score: default_min_topic_score(),
            per_page: default_per_page(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_min_topic_score() -> f64 {
    DEFAULT_MIN_TOPIC_SCORE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// Result cache sizing and lifetimes.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_index_ttl")]
    pub index_ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl(),
            index_ttl_secs: default_index_ttl(),
        }
    }
}

fn default_max_entries() -> u64 {
    10_000
}

fn default_ttl() -> u64 {
    3600
}

fn default_index_ttl() -> u64 {
    3 * 3600
}

impl From<&CacheSection> for CacheConfig {
    fn from(section: &CacheSection) -> Self {
        CacheConfig::new()
            .max_entries(section.max_entries)
            .ttl(Duration::from_secs(section.ttl_secs))
            .index_ttl(Duration::from_secs(section.index_ttl_secs))
    }
}

/// Bearer tokens accepted by the HTTP surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// May send feedback and report post transitions.
    #[serde(default)]
    pub editor_tokens: Vec<String>,
    /// May change settings and deactivate.
    #[serde(default)]
    pub admin_tokens: Vec<String>,
}

/// Secrets configuration (API key).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing
    /// standard file is used, or defaults when there is none.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            info!("no config file found, using defaults");
            return Ok(Config::default());
        };
        Self::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KapowError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            KapowError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(KapowError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".kapow").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/kapow/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Initial settings: model parameters from config, key from secrets.
    pub fn settings(&self, secrets: &Secrets) -> Settings {
        let settings = Settings::new(
            secrets.api_key().unwrap_or_default(),
            self.model.threshold,
            self.model.min_topic_score,
            self.model.per_page,
        );
        if settings.uses_default_key() {
            info!("no API key configured, using the public demo key");
        }
        settings
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::from(&self.cache)
    }

    pub fn image_source(&self) -> ImageSource {
        ImageSource::new(&self.api.image_source, &self.api.image_source_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".kapow").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/kapow/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KapowError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            KapowError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            KapowError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(KapowError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// API key from the secrets file, falling back to `KAPOW_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV_VAR).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:9742");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 45);
        assert_eq!(config.api.image_source, "Unsplash");
        assert_eq!(config.model.per_page, 5);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.cache.index_ttl_secs, 10_800);
        assert!(config.auth.editor_tokens.is_empty());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8080"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert_eq!(config.model.threshold, 0.9);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9000"

            [api]
            base_url = "http://localhost:1234/api"
            timeout_secs = 10
            image_source = "Pexels"
            image_source_url = "https://pexels.com/"

            [model]
            threshold = 0.7
            min_topic_score = 0.6
            per_page = 8

            [cache]
            max_entries = 100
            ttl_secs = 60
            index_ttl_secs = 180

            [auth]
            editor_tokens = ["ed"]
            admin_tokens = ["adm"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.image_source(),
            ImageSource::new("Pexels", "https://pexels.com/")
        );
        assert_eq!(config.model.per_page, 8);
        let cache = config.cache_config();
        assert_eq!(cache.max_entries, 100);
        assert_eq!(cache.ttl, Duration::from_secs(60));
        assert_eq!(cache.index_ttl, Duration::from_secs(180));
        assert_eq!(config.auth.editor_tokens, vec!["ed"]);
        assert_eq!(config.auth.admin_tokens, vec!["adm"]);
    }

    #[test]
    fn settings_are_clamped() {
        let toml = r#"
            [model]
            threshold = 0.2
            per_page = 99
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let secrets = Secrets {
            api_key: Some("from-file".into()),
        };
        let settings = config.settings(&secrets);
        assert_eq!(settings.api_key, "from-file");
        assert_eq!(settings.threshold, 0.5);
        assert_eq!(settings.per_page, 10);
    }

    #[test]
    fn parse_secrets() {
        let secrets: Secrets = toml::from_str(r#"api_key = "abc""#).unwrap();
        assert_eq!(secrets.api_key(), Some("abc".to_string()));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
