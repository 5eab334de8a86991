//! Cluster query sources
//!
//! Everything the inventory knows about the cluster comes through a
//! [`ClusterSource`]. The production implementation shells out to `pvesh`;
//! tests use an in-memory mock.

mod pvesh;

#[cfg(test)]
pub(crate) mod mock;

pub use pvesh::PveshSource;

use crate::error::QueryError;
use serde::de::DeserializeOwned;

pub use async_trait::async_trait;

/// Trait for cluster management API access
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Query an API path with optional `--key value` filters
    ///
    /// Returns `Ok(None)` when the call succeeded but produced no data.
    async fn query(
        &self,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, QueryError>;
}

/// Query a path returning a list and decode each entry
///
/// An empty response yields an empty list.
pub async fn query_list<T: DeserializeOwned>(
    source: &dyn ClusterSource,
    path: &str,
    filters: &[(&str, &str)],
) -> Result<Vec<T>, QueryError> {
    match source.query(path, filters).await? {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value).map_err(|source| QueryError::Shape {
            path: path.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockSource;
    use super::*;
    use crate::models::NodeEntry;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_list_decodes_entries() {
        let source = MockSource::new().with("/nodes", json!([{"node": "pve1"}, {"node": "pve2"}]));

        let nodes: Vec<NodeEntry> = query_list(&source, "/nodes", &[]).await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].node.as_deref(), Some("pve2"));
    }

    #[tokio::test]
    async fn test_query_list_empty_response() {
        let source = MockSource::new().with_empty("/nodes");

        let nodes: Vec<NodeEntry> = query_list(&source, "/nodes", &[]).await.unwrap();
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_query_list_wrong_shape() {
        let source = MockSource::new().with("/nodes", json!({"node": "pve1"}));

        let result: Result<Vec<NodeEntry>, _> = query_list(&source, "/nodes", &[]).await;
        assert!(matches!(result, Err(QueryError::Shape { .. })));
    }
}
