//! Configuration schema for conan-cleanup
//!
//! Configuration is stored at `~/.config/conan-cleanup/config.toml`

use crate::usage::DEFAULT_DESCRIPTOR_NAME;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Conan executable settings
    pub conan: ConanConfig,

    /// Cleanup behaviour
    pub cleanup: CleanupConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append every removal attempt to the removal journal
    pub removal_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            removal_log: true,
        }
    }
}

/// Conan command-line dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConanApi {
    /// Conan 1.x (`conan search -j`)
    V1,
    /// Conan 2.x (`conan list --format=json`)
    #[default]
    V2,
}

impl fmt::Display for ConanApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

/// Conan executable configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConanConfig {
    /// Executable name or path
    pub binary: String,

    /// Command-line dialect of that executable
    pub api: ConanApi,

    /// Timeout for every conan invocation, in seconds
    pub timeout_secs: u64,
}

impl ConanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ConanConfig {
    fn default() -> Self {
        Self {
            binary: "conan".to_string(),
            api: ConanApi::V2,
            timeout_secs: 120,
        }
    }
}

/// Cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// File names treated as descriptors
    pub descriptor_names: Vec<String>,

    /// Descriptors read and parsed concurrently
    pub parse_concurrency: usize,

    /// Remove recipes left without binaries after a cleanup
    pub prune_empty_recipes: bool,

    /// Follow symlinks while walking the project tree
    pub follow_links: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            descriptor_names: vec![DEFAULT_DESCRIPTOR_NAME.to_string()],
            parse_concurrency: 8,
            prune_empty_recipes: true,
            follow_links: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[conan]"));
        assert!(toml.contains("api = \"v2\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.conan.binary, "conan");
        assert_eq!(config.cleanup.descriptor_names, vec!["conaninfo.txt"]);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [conan]
            api = "v1"
            timeout_secs = 30
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.conan.api, ConanApi::V1);
        assert_eq!(config.conan.timeout(), Duration::from_secs(30));
        assert!(config.cleanup.prune_empty_recipes); // default preserved
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let conan = ConanConfig {
            timeout_secs: 0,
            ..ConanConfig::default()
        };
        assert_eq!(conan.timeout(), Duration::from_secs(1));
    }
}
