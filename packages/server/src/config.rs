use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds an idle pooled connection is kept. `None` keeps it forever.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_lifetime_secs: Option<u64>,
}

fn default_max_connections() -> u32 {
    100
}

fn default_min_connections() -> u32 {
    5
}

impl DatabaseConfig {
    /// Single-connection in-memory SQLite. Each pooled connection would get
    /// its own database, so the pool is pinned to one connection that never
    /// expires.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout_secs: None,
            max_lifetime_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub media_dir: PathBuf,
    /// Maximum accepted image upload in bytes.
    pub max_image_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("./data/media"),
            max_image_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContentConfig {
    /// Key prefix selected by the hero image reset.
    pub hero_prefix: String,
    pub hero_suffix: String,
    pub default_revision_limit: u64,
    pub max_revision_limit: u64,
    pub max_content_bytes: usize,
    pub max_key_length: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            hero_prefix: "home.hero.".into(),
            hero_suffix: ".image".into(),
            default_revision_limit: 10,
            max_revision_limit: 50,
            max_content_bytes: 1_000_000,
            max_key_length: 255,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.media_dir", "./data/media")?
            .set_default("storage.max_image_size", 10 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CMS__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("CMS").separator("__")))
    }
}
