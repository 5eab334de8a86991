//! Size unit normalization
//!
//! Proxmox writes disk sizes as `32G`, `512M`, `1.5T`, `4096K` or as a bare
//! number of MiB. Everything is normalized to whole MiB.

const MIB_PER_GIB: u64 = 1024;
const MIB_PER_TIB: u64 = 1024 * 1024;

/// Convert a size token to MiB
///
/// A fractional part is truncated before conversion, so `1.5G` is 1024 MiB.
/// Unknown unit letters are treated as MiB. Returns `None` for empty input
/// or when the numeric part does not parse.
pub fn normalize_to_mib(token: &str) -> Option<u64> {
    let unit = token.chars().last()?;

    if unit.is_ascii_digit() {
        return token.parse().ok();
    }

    let number = &token[..token.len() - unit.len_utf8()];
    let number = match number.split_once('.') {
        Some((whole, _)) => whole,
        None => number,
    };
    let value: u64 = number.parse().ok()?;

    match unit.to_ascii_uppercase() {
        'K' => Some(value / 1024),
        'M' => Some(value),
        'G' => value.checked_mul(MIB_PER_GIB),
        'T' => value.checked_mul(MIB_PER_TIB),
        _ => Some(value),
    }
}

/// Format MiB for humans, keeping the raw figure, e.g. `2048 (2.00 GiB)`
pub fn humanize(mib: u64) -> String {
    if mib >= MIB_PER_TIB {
        format!("{} ({:.2} TiB)", mib, mib as f64 / MIB_PER_TIB as f64)
    } else if mib >= MIB_PER_GIB {
        format!("{} ({:.2} GiB)", mib, mib as f64 / MIB_PER_GIB as f64)
    } else {
        format!("{} ({} MiB)", mib, mib)
    }
}

/// Whole MiB in a byte count
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}
