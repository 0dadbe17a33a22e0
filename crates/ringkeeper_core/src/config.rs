//! Configuration loading from environment variables.

use crate::backup::{CompressionType, EncryptionAlgorithm};
use crate::constants::{
    DEFAULT_BACKUP_LOCATION, DEFAULT_CLUSTER_NAME, DEFAULT_DATA_DIR, DEFAULT_NODE_TOKEN,
    DEFAULT_REGION,
};
use crate::identity::ClusterIdentity;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration for the placement layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backup_location: String,
    pub cluster_name: String,
    pub region: String,
    pub node_token: String,
    pub data_dir: PathBuf,
    pub compression: CompressionType,
    pub encryption: EncryptionAlgorithm,
    pub racks: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_location: DEFAULT_BACKUP_LOCATION.to_string(),
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            node_token: DEFAULT_NODE_TOKEN.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            compression: CompressionType::default(),
            encryption: EncryptionAlgorithm::default(),
            racks: Vec::new(),
        }
    }
}

/// Split a comma-separated environment value into trimmed, non-empty items.
///
/// # Returns
/// Items in their original order.
pub fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse an algorithm name case-insensitively, keeping `default` on failure.
fn env_algorithm<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Ok(raw) = env::var(name) else {
        return default;
    };
    match raw.trim().to_ascii_uppercase().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Ignoring unrecognized {} value '{}'", name, raw);
            default
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backup_location: env_string("BACKUP_LOCATION", DEFAULT_BACKUP_LOCATION),
            cluster_name: env_string("CLUSTER_NAME", DEFAULT_CLUSTER_NAME),
            region: env_string("REGION", DEFAULT_REGION),
            node_token: env_string("NODE_TOKEN", DEFAULT_NODE_TOKEN),
            data_dir: PathBuf::from(env_string("DATA_DIR", DEFAULT_DATA_DIR)),
            compression: env_algorithm("BACKUP_COMPRESSION", defaults.compression),
            encryption: env_algorithm("BACKUP_ENCRYPTION", defaults.encryption),
            racks: env::var("RACKS")
                .map(|value| parse_env_list(&value))
                .unwrap_or_default(),
        }
    }
}

impl ClusterIdentity for Config {
    fn backup_root(&self) -> &str {
        &self.backup_location
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn node_token(&self) -> &str {
        &self.node_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{lock_env, EnvGuard};

    const VARS: [&str; 8] = [
        "BACKUP_LOCATION",
        "CLUSTER_NAME",
        "REGION",
        "NODE_TOKEN",
        "DATA_DIR",
        "BACKUP_COMPRESSION",
        "BACKUP_ENCRYPTION",
        "RACKS",
    ];

    #[test]
    fn parse_env_list_trims_and_skips_empty_items() {
        assert_eq!(
            parse_env_list(" az1, az2 ,,az3 "),
            vec!["az1".to_string(), "az2".to_string(), "az3".to_string()]
        );
        assert!(parse_env_list("").is_empty());
    }

    #[test]
    fn from_env_applies_defaults() {
        let _lock = lock_env();
        let _guards: Vec<EnvGuard> = VARS.iter().map(|key| EnvGuard::remove(key)).collect();

        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = lock_env();
        let _guards = vec![
            EnvGuard::set("BACKUP_LOCATION", "casstestbackup"),
            EnvGuard::set("CLUSTER_NAME", "fake-app"),
            EnvGuard::set("REGION", "us-west-2"),
            EnvGuard::set("NODE_TOKEN", "1808575600"),
            EnvGuard::set("DATA_DIR", "target/data"),
            EnvGuard::set("BACKUP_COMPRESSION", "lz4"),
            EnvGuard::set("BACKUP_ENCRYPTION", "PGP"),
            EnvGuard::set("RACKS", "az1,az2,az3"),
        ];

        let config = Config::from_env();
        assert_eq!(config.backup_root(), "casstestbackup");
        assert_eq!(config.cluster_name(), "fake-app");
        assert_eq!(config.region(), "us-west-2");
        assert_eq!(config.node_token(), "1808575600");
        assert_eq!(config.data_dir, PathBuf::from("target/data"));
        assert_eq!(config.compression, CompressionType::Lz4);
        assert_eq!(config.encryption, EncryptionAlgorithm::Pgp);
        assert_eq!(config.racks.len(), 3);
    }

    #[test]
    fn unknown_algorithm_falls_back_to_default() {
        let _lock = lock_env();
        let _compression = EnvGuard::set("BACKUP_COMPRESSION", "brotli");
        let _encryption = EnvGuard::set("BACKUP_ENCRYPTION", "rot13");

        let config = Config::from_env();
        assert_eq!(config.compression, CompressionType::Snappy);
        assert_eq!(config.encryption, EncryptionAlgorithm::Plaintext);
    }
}
