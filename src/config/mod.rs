use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::models::SourceEntry;
use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Response cache tuning.
///
/// `ttl` bounds how long a rendered document is reused in-process and is also
/// advertised as `max-age`; `shared_ttl` only feeds the `s-maxage` directive
/// for downstream shared caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_ttl", with = "duration_serde::duration")]
    pub ttl: Duration,
    #[serde(
        default = "default_cache_shared_ttl",
        with = "duration_serde::duration"
    )]
    pub shared_ttl: Duration,
}

/// Seed merge policy loaded into the in-memory policy store at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Ordered source table; order decides dedup precedence
    #[serde(default = "default_source_table")]
    pub sources: Vec<SourceEntry>,
    /// Key into the source table; entries from that source are authoritative
    /// members of the designated group. Absent means no designated source;
    /// the freshly generated default file sets it explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designated_source: Option<String>,
    /// Whether serialized documents get normalized group labels
    #[serde(default = "default_rewrite_labels")]
    pub rewrite_labels: bool,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Cache defaults
fn default_cache_enabled() -> bool {
    DEFAULT_CACHE_ENABLED
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
}

fn default_cache_shared_ttl() -> Duration {
    Duration::from_secs(DEFAULT_CACHE_SHARED_TTL_SECS)
}

// Policy defaults
fn default_designated_source() -> Option<String> {
    Some(DEFAULT_DESIGNATED_SOURCE.to_string())
}

fn default_rewrite_labels() -> bool {
    DEFAULT_REWRITE_LABELS
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            capacity: default_cache_capacity(),
            ttl: default_cache_ttl(),
            shared_ttl: default_cache_shared_ttl(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            sources: default_source_table(),
            designated_source: default_designated_source(),
            rewrite_labels: default_rewrite_labels(),
        }
    }
}

impl Config {
    /// Load configuration from the given file, creating a default config
    /// file when none exists yet.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
