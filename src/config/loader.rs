// Configuration loader with environment variable substitution

use super::types::*;
use crate::storage::BackendKind;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::net::SocketAddr;
use std::path::Path;

const ENV_PLACEHOLDER: &str = r"\$\{([^}:]+)(?::-([^}]+))?\}";
const IDENTIFIER: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        Self::parse(&content)
    }

    /// Parse YAML text, substituting environment variables first.
    ///
    /// Not validated here: overrides applied afterwards may still replace
    /// invalid values. Call [`ConfigLoader::validate`] once they are in.
    pub fn parse(content: &str) -> Result<AppConfig> {
        let content = Self::substitute_env_vars(content)?;

        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns with environment variables
    ///
    /// Examples:
    /// - ${REDIS_HOST} -> 10.0.0.5
    /// - ${DATA_ACCESS:-key-value} -> key-value (if DATA_ACCESS not set)
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(ENV_PLACEHOLDER).context("Invalid placeholder pattern")?;

        let substituted = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    // Keep original if no default and var not found
                    None => format!("${{{}}}", var_name),
                },
            }
        });

        Ok(substituted.into_owned())
    }

    /// Validate configuration
    ///
    /// Runs before any adapter is built, so a bad backend name stops the
    /// process before a single connection attempt.
    pub fn validate(config: &AppConfig) -> Result<()> {
        config
            .storage
            .backend
            .parse::<BackendKind>()
            .map_err(anyhow::Error::new)?;

        let identifier = Regex::new(IDENTIFIER).context("Invalid identifier pattern")?;
        let identifiers = [
            ("storage.cassandra.keyspace", &config.storage.cassandra.keyspace),
            ("storage.cassandra.table", &config.storage.cassandra.table),
            ("storage.postgres.table", &config.storage.postgres.table),
            ("storage.mysql.table", &config.storage.mysql.table),
        ];
        for (field, value) in identifiers {
            if !identifier.is_match(value) {
                bail!("{} must be a plain identifier, got '{}'", field, value);
            }
        }

        if config.storage.mongo.database.is_empty() {
            bail!("storage.mongo.database cannot be empty");
        }

        if config.storage.mongo.collection.is_empty() {
            bail!("storage.mongo.collection cannot be empty");
        }

        if config.storage.redis.key.is_empty() {
            bail!("storage.redis.key cannot be empty");
        }

        config
            .server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("server.bind is not a socket address: '{}'", config.server.bind))?;

        match config.logging.format.as_str() {
            "text" | "json" => {}
            other => bail!("logging.format must be 'text' or 'json', got '{}'", other),
        }

        Ok(())
    }
}
