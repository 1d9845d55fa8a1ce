//! Human-readable byte sizes.

const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];
const FACTOR: f64 = 1024.0;

/// Scale a byte count with binary units, e.g. `1536 -> "1.50KB"`.
pub fn format_size(bytes: u64) -> String {
    format_size_with_suffix(bytes, "B")
}

/// Same as [`format_size`] with a custom suffix (`"B/s"` for rates).
///
/// Anything beyond petabytes stays in `P`.
pub fn format_size_with_suffix(bytes: u64, suffix: &str) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= FACTOR && unit < UNITS.len() - 1 {
        value /= FACTOR;
        unit += 1;
    }
    format!("{value:.2}{}{suffix}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_size(0), "0.00B");
    }

    #[test]
    fn test_kilobytes() {
        assert_eq!(format_size(1536), "1.50KB");
        assert_eq!(format_size(1023), "1023.00B");
        assert_eq!(format_size(1024), "1.00KB");
    }

    #[test]
    fn test_larger_units() {
        assert_eq!(format_size(1_253_656), "1.20MB");
        assert_eq!(format_size(1_253_656_678), "1.17GB");
        assert_eq!(format_size(1024u64.pow(4)), "1.00TB");
        assert_eq!(format_size(1024u64.pow(5)), "1.00PB");
    }

    #[test]
    fn test_beyond_petabytes_stays_p() {
        assert_eq!(format_size(1024u64.pow(6)), "1024.00PB");
        assert!(format_size(u64::MAX).ends_with("PB"));
    }

    #[test]
    fn test_rate_suffix() {
        assert_eq!(format_size_with_suffix(2048, "B/s"), "2.00KB/s");
    }

    #[test]
    fn test_unit_is_monotonic() {
        let rank = |s: String| {
            let unit = s.trim_end_matches('B').chars().last().unwrap_or('0');
            UNITS
                .iter()
                .position(|u| u.chars().next() == Some(unit))
                .unwrap_or(0)
        };
        let mut last = 0;
        for exp in 0..60 {
            let r = rank(format_size(1u64 << exp));
            assert!(r >= last, "unit shrank at 2^{exp}");
            last = r;
        }
    }
}
