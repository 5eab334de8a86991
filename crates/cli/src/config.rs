//! Configuration management for the CLI
//!
//! Settings are layered: built-in defaults, then the optional config file,
//! then `PVESI_*` environment variables. Command-line flags override all of
//! them in `main`.

use anyhow::{Context, Result};
use inventory_lib::membership::DEFAULT_COROSYNC_CONF;
use inventory_lib::OutputFormat;
use serde::Deserialize;
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the pvesh binary
    #[serde(default = "default_pvesh_path")]
    pub pvesh_path: PathBuf,

    /// Path to corosync.conf
    #[serde(default = "default_corosync_conf")]
    pub corosync_conf: PathBuf,

    /// Parallel pvesh calls
    #[serde(default)]
    pub workers: Option<usize>,

    /// Default output format
    #[serde(default)]
    pub output: Option<OutputFormat>,

    /// Diagnostic log format
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_pvesh_path() -> PathBuf {
    PathBuf::from("pvesh")
}

fn default_corosync_conf() -> PathBuf {
    PathBuf::from(DEFAULT_COROSYNC_CONF)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pvesh_path: default_pvesh_path(),
            corosync_conf: default_corosync_conf(),
            workers: None,
            output: None,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration using a specific (optional) config file
    pub fn load_from(file: Option<PathBuf>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("PVESI").try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("pve-storage-info").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(Some(dir.path().join("missing.toml"))).unwrap();

        assert_eq!(config.corosync_conf, PathBuf::from(DEFAULT_COROSYNC_CONF));
        assert_eq!(config.output, None);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_values_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "pvesh_path = \"/usr/local/bin/pvesh\"\nworkers = 4\noutput = \"json\"\nlog_format = \"json\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();

        assert_eq!(config.pvesh_path, PathBuf::from("/usr/local/bin/pvesh"));
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.output, Some(OutputFormat::Structured));
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
