//! `pvesh` command-line source
//!
//! Runs `pvesh get <path> [--key value]... --output-format json` and decodes
//! the JSON it prints.

use super::ClusterSource;
use crate::error::QueryError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Cluster source backed by the `pvesh` binary
#[derive(Debug, Clone)]
pub struct PveshSource {
    binary: PathBuf,
}

impl PveshSource {
    /// Use `pvesh` from `PATH`
    pub fn new() -> Self {
        Self::with_binary("pvesh")
    }

    /// Use a specific binary (a wrapper script, or a fake in tests)
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments passed to the binary for one query
    fn build_args(path: &str, filters: &[(&str, &str)]) -> Vec<String> {
        let mut args = vec!["get".to_string(), path.to_string()];
        for (key, value) in filters {
            args.push(format!("--{key}"));
            args.push((*value).to_string());
        }
        args.push("--output-format".to_string());
        args.push("json".to_string());
        args
    }
}

impl Default for PveshSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterSource for PveshSource {
    async fn query(
        &self,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, QueryError> {
        let args = Self::build_args(path, filters);
        debug!(binary = %self.binary.display(), path = %path, "Running query");

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|source| QueryError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(QueryError::CommandFailed {
                path: path.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&stdout)
            .map(Some)
            .map_err(|source| QueryError::Decode {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_without_filters() {
        let args = PveshSource::build_args("/cluster/status", &[]);
        assert_eq!(
            args,
            vec!["get", "/cluster/status", "--output-format", "json"]
        );
    }

    #[test]
    fn test_build_args_with_filters() {
        let args = PveshSource::build_args("/cluster/resources", &[("type", "vm")]);
        assert_eq!(
            args,
            vec![
                "get",
                "/cluster/resources",
                "--type",
                "vm",
                "--output-format",
                "json"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let source = PveshSource::with_binary("/nonexistent/pvesh-binary");
        let result = source.query("/nodes", &[]).await;
        assert!(matches!(result, Err(QueryError::Spawn { .. })));
    }
}
