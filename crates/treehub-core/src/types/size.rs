//! Human-readable byte counts for log lines and error messages.

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Render a byte count using binary (1024) multiples, e.g. `1.50 KB`.
///
/// Negative values (used for "unlimited" quotas) render as `unlimited`.
pub fn human_size(bytes: i64) -> String {
    if bytes < 0 {
        return "unlimited".to_string();
    }
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
