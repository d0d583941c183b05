//! Human-readable size formatting for run summaries.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with base-1024 units, rounded to two decimals.
///
/// Trailing zeros are dropped: `1536` is `1.5 KB`, `2097152` is `2 MB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= 1024.0 && exp < UNITS.len() - 1 {
        value /= 1024.0;
        exp += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exp])
}

/// Share of `original` saved by `processed`, as a rounded percentage.
///
/// Zero when nothing was measured; negative when the output grew.
pub fn percent_saved(original: u64, processed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let saved = original as f64 - processed as f64;
    (saved / original as f64 * 100.0).round() as i64
}

/// Share of `limit` used by `used`, as a rounded percentage.
pub fn percent_of(used: u64, limit: u64) -> i64 {
    if limit == 0 {
        return 0;
    }
    (used as f64 / limit as f64 * 100.0).round() as i64
}
