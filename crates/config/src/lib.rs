use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "realty.toml",
    "config/realty.toml",
    "crates/config/realty.toml",
    "../realty.toml",
    "../config/realty.toml",
    "../crates/config/realty.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://realty.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Admin sessions are forced to sign in again after this many seconds.
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_reset_ttl")]
    pub password_reset_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            password_reset_ttl_seconds: Self::default_reset_ttl(),
            min_password_length: Self::default_min_password_length(),
        }
    }
}

impl AuthConfig {
    const fn default_session_ttl() -> u64 {
        5 * 60 * 60
    }

    const fn default_reset_ttl() -> u64 {
        60 * 60
    }

    const fn default_min_password_length() -> usize {
        6
    }
}

/// Settings for the external image host used by listing galleries and
/// broker photos.
///
/// ```
/// use realty_config::MediaConfig;
///
/// let media = MediaConfig::default();
/// assert_eq!(media.upload_url, "https://api.imgbb.com/1/upload");
/// assert_eq!(media.request_timeout_seconds, 30);
/// assert!(media.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "MediaConfig::default_upload_url")]
    pub upload_url: String,
    #[serde(default = "MediaConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl MediaConfig {
    fn default_upload_url() -> String {
        "https://api.imgbb.com/1/upload".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            upload_url: Self::default_upload_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "CatalogConfig::default_page_size")]
    pub page_size: usize,
    #[serde(default = "CatalogConfig::default_featured_limit")]
    pub featured_limit: usize,
    #[serde(default = "CatalogConfig::default_carousel_size")]
    pub featured_carousel_size: usize,
}

impl CatalogConfig {
    const fn default_page_size() -> usize {
        6
    }

    const fn default_featured_limit() -> usize {
        5
    }

    const fn default_carousel_size() -> usize {
        6
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            featured_limit: Self::default_featured_limit(),
            featured_carousel_size: Self::default_carousel_size(),
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use realty_config::load;
///
/// std::env::remove_var("REALTY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default(
            "auth.session_ttl_seconds",
            clamp_to_i64(defaults.auth.session_ttl_seconds),
        )?
        .set_default(
            "auth.password_reset_ttl_seconds",
            clamp_to_i64(defaults.auth.password_reset_ttl_seconds),
        )?
        .set_default(
            "auth.min_password_length",
            clamp_to_i64(defaults.auth.min_password_length as u64),
        )?
        .set_default("media.upload_url", defaults.media.upload_url.clone())?
        .set_default(
            "media.request_timeout_seconds",
            clamp_to_i64(defaults.media.request_timeout_seconds),
        )?
        .set_default(
            "catalog.page_size",
            clamp_to_i64(defaults.catalog.page_size as u64),
        )?
        .set_default(
            "catalog.featured_limit",
            clamp_to_i64(defaults.catalog.featured_limit as u64),
        )?
        .set_default(
            "catalog.featured_carousel_size",
            clamp_to_i64(defaults.catalog.featured_carousel_size as u64),
        )?;

    let environment_overrides = config::Environment::with_prefix("REALTY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("REALTY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via REALTY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }
    if config.auth.password_reset_ttl_seconds > i64::MAX as u64 {
        config.auth.password_reset_ttl_seconds = i64::MAX as u64;
    }
    if config.catalog.page_size == 0 {
        config.catalog.page_size = CatalogConfig::default_page_size();
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
