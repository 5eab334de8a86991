//! Corosync cluster membership
//!
//! Reads `cluster_name` and each node's `ring0_addr` from `corosync.conf`.
//! The file is optional: a missing or unreadable file means "no membership
//! data", never an error.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Default location of the corosync configuration on a PVE node
pub const DEFAULT_COROSYNC_CONF: &str = "/etc/corosync/corosync.conf";

/// Membership data read from corosync.conf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    pub cluster_name: Option<String>,
    /// Node name -> ring0 address
    pub nodes: BTreeMap<String, String>,
}

/// Parse corosync.conf contents
///
/// Only `key: value` lines matter; the block structure is not tracked
/// beyond remembering the last `name:` seen.
pub fn parse_membership(content: &str) -> Membership {
    let mut membership = Membership::default();
    let mut current_node: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key {
            "cluster_name" => membership.cluster_name = Some(value.to_string()),
            "name" => current_node = Some(value.to_string()),
            "ring0_addr" => {
                if let Some(node) = current_node.as_ref().filter(|n| !n.is_empty()) {
                    membership.nodes.insert(node.clone(), value.to_string());
                }
            }
            _ => {}
        }
    }

    membership
}

/// Load membership from a file, best effort
pub async fn load_membership(path: &Path) -> Option<Membership> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(parse_membership(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read corosync config");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COROSYNC_CONF: &str = r#"
logging {
  debug: off
  to_syslog: yes
}

nodelist {
  node {
    name: pve1
    nodeid: 1
    quorum_votes: 1
    ring0_addr: 10.0.0.11
  }
  node {
    name: pve2
    nodeid: 2
    quorum_votes: 1
    ring0_addr: 10.0.0.12
  }
}

quorum {
  provider: corosync_votequorum
}

totem {
  # comment: ignored
  cluster_name: prod-cluster
  config_version: 3
  interface {
    linknumber: 0
  }
  ip_version: ipv4-6
  version: 2
}
"#;

    #[test]
    fn test_parse_membership() {
        let membership = parse_membership(COROSYNC_CONF);

        assert_eq!(membership.cluster_name.as_deref(), Some("prod-cluster"));
        assert_eq!(membership.nodes.len(), 2);
        assert_eq!(membership.nodes["pve1"], "10.0.0.11");
        assert_eq!(membership.nodes["pve2"], "10.0.0.12");
    }

    #[test]
    fn test_ring0_before_any_name_is_ignored() {
        let membership = parse_membership("ring0_addr: 10.0.0.1\nname: pve1\n");
        assert!(membership.nodes.is_empty());
        assert_eq!(membership.cluster_name, None);
    }

    #[test]
    fn test_ipv6_ring_address_keeps_colons() {
        let membership = parse_membership("name: pve1\nring0_addr: fd00::11\n");
        assert_eq!(membership.nodes["pve1"], "fd00::11");
    }

    #[tokio::test]
    async fn test_load_membership_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corosync.conf");
        tokio::fs::write(&path, COROSYNC_CONF).await.unwrap();

        let membership = load_membership(&path).await.unwrap();
        assert_eq!(membership.nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let membership = load_membership(&dir.path().join("absent.conf")).await;
        assert!(membership.is_none());
    }
}
