// Configuration module for sensor-storage
//
// Provides:
// - YAML configuration file loading
// - Environment variable substitution
// - Configuration validation
// - Default values

pub mod types;
mod loader;

pub use types::*;
pub use loader::ConfigLoader;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load configuration from a YAML file, without overrides or validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    ConfigLoader::load(path).context("Failed to load configuration")
}

/// Load configuration with environment variable overrides, then validate
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config);
    ConfigLoader::validate(&config)?;
    Ok(config)
}

/// Load the file if it exists, otherwise start from built-in defaults.
/// Environment overrides apply in both cases.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    load_with_overrides(path, |_| {})
}

/// Like [`load_or_default`], with caller overrides (CLI flags) applied
/// after the environment ones. Validation runs once, on the final values.
pub fn load_with_overrides<P, F>(path: P, overrides: F) -> Result<AppConfig>
where
    P: AsRef<Path>,
    F: FnOnce(&mut AppConfig),
{
    let mut config = if path.as_ref().exists() {
        load_config(path)?
    } else {
        debug!(
            "No configuration at {}, using defaults",
            path.as_ref().display()
        );
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    overrides(&mut config);
    ConfigLoader::validate(&config)?;
    Ok(config)
}

/// Allow environment variables to override config values
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(backend) = std::env::var("DATA_ACCESS") {
        config.storage.backend = backend;
    }

    if let Ok(contact_point) = std::env::var("CASSANDRA_CONTACT_POINT") {
        config.storage.cassandra.contact_point = contact_point;
    }

    if let Ok(uri) = std::env::var("MONGO_URI") {
        config.storage.mongo.uri = uri;
    }

    if let Ok(url) = std::env::var("POSTGRES_URL") {
        config.storage.postgres.url = url;
    }

    if let Ok(url) = std::env::var("MYSQL_URL") {
        config.storage.mysql.url = url;
    }

    if let Ok(url) = std::env::var("REDIS_URL") {
        config.storage.redis.url = url;
    }
}
