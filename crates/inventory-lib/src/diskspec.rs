//! Disk specification parsing
//!
//! A disk spec looks like `local-lvm:vm-100-disk-0,cache=none,size=32G`.
//! The scan is deliberately loose: storage is whatever precedes the first
//! `:`, the volume runs to the first `,`, and the size is read after the
//! last `size=` found anywhere in the string.

use crate::units::normalize_to_mib;

const SIZE_MARKER: &str = "size=";

/// Disk fields extracted from one configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSpec {
    pub storage: String,
    pub volume: String,
    /// Size token as written, e.g. `32G`
    pub size_text: String,
    pub size_mib: u64,
}

/// Parse a disk spec, returning `None` when the value is not a sized disk
pub fn parse(spec: &str) -> Option<DiskSpec> {
    let (storage, rest) = spec.split_once(':')?;
    let volume = rest.split(',').next().unwrap_or(rest);

    if storage.is_empty() || volume.is_empty() {
        return None;
    }

    let pos = spec.rfind(SIZE_MARKER)?;
    let tail = &spec[pos + SIZE_MARKER.len()..];
    let size_text = tail.split(',').next().unwrap_or(tail).trim();

    if size_text.is_empty() {
        return None;
    }

    let size_mib = normalize_to_mib(size_text)?;

    Some(DiskSpec {
        storage: storage.to_string(),
        volume: volume.to_string(),
        size_text: size_text.to_string(),
        size_mib,
    })
}
