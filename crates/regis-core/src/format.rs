//! Human-readable byte counts for attachment lists and previews.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const STEP: f64 = 1024.0;

/// Format a byte count as e.g. `"1.50 KB"`.
///
/// Picks the largest unit whose scaled value is at least 1. A value that
/// would print as `1024.00` moves up one unit. Sizes past the last unit
/// stay in GB, so from 1024 GB on the number is 1024 or more.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let raw = bytes as f64;
    let mut exponent = (raw.log(STEP).floor() as usize).min(UNITS.len() - 1);

    // log() can land just below an exact power of 1024
    if exponent + 1 < UNITS.len() && raw >= STEP.powi(exponent as i32 + 1) {
        exponent += 1;
    }

    let mut scaled = raw / STEP.powi(exponent as i32);
    if exponent + 1 < UNITS.len() && (scaled * 100.0).round() >= STEP * 100.0 {
        exponent += 1;
        scaled = raw / STEP.powi(exponent as i32);
    }

    format!("{:.2} {}", scaled, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn test_known_values() {
        assert_eq!(format_size(1), "1.00 Bytes");
        assert_eq!(format_size(512), "512.00 Bytes");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
    }

    #[test]
    fn test_rounding_promotes_to_next_unit() {
        // 1048575 / 1024 = 1023.999...
        assert_eq!(format_size(1_048_575), "1.00 MB");
    }

    #[test]
    fn test_largest_unit_is_gb() {
        assert_eq!(format_size(2 * 1024 * 1024 * 1024 * 1024), "2048.00 GB");
    }

    fn numeric_part(formatted: &str) -> f64 {
        formatted
            .split(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap()
    }

    proptest! {
        // GB is the largest unit, so from 1024 GB (2^40 bytes) on the numeric
        // part keeps growing; see test_largest_unit_is_gb
        #[test]
        fn prop_numeric_part_in_range(bytes in 1u64..(1u64 << 40)) {
            let formatted = format_size(bytes);
            let value = numeric_part(&formatted);
            prop_assert!((1.0..1024.0).contains(&value), "{} -> {}", bytes, formatted);
        }

        #[test]
        fn prop_deterministic(bytes in any::<u64>()) {
            prop_assert_eq!(format_size(bytes), format_size(bytes));
        }

        #[test]
        fn prop_two_decimals(bytes in 1u64..(1u64 << 40)) {
            let formatted = format_size(bytes);
            let number = formatted.split(' ').next().unwrap();
            let decimals = number.split('.').nth(1).unwrap();
            prop_assert_eq!(decimals.len(), 2);
        }
    }
}
