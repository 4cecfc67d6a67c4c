// Human-readable sizes and dates for listings

use chrono::{DateTime, NaiveDateTime};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// `0 B`, `512 B`, `1.5 KB`, `2 MB` ... in powers of 1024, one decimal at most.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let mut rounded = (value * 10.0).round() / 10.0;
    // 1023.96 KB rounds to 1024 KB; show it as the next unit instead.
    if rounded >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        rounded /= 1024.0;
        unit += 1;
    }
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, SIZE_UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, SIZE_UNITS[unit])
    }
}

/// `Jan 1, 2024` for provider timestamps; unparsable input is returned as is.
pub fn format_date(timestamp: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return parsed.format("%b %-d, %Y").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S") {
        return parsed.format("%b %-d, %Y").to_string();
    }
    timestamp.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(120), "120 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_file_size(3 * 1024u64.pow(5)), "3072 TB");
    }

    #[test]
    fn test_rounding_promotes_to_next_unit() {
        assert_eq!(format_file_size(1_048_575), "1 MB");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024 * 1024 * 1024 - 1), "1 GB");
        assert_eq!(format_file_size(1_047_552), "1023 KB");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-01T00:00:00Z"), "Jan 1, 2024");
        assert_eq!(format_date("2023-11-15T08:30:00.000Z"), "Nov 15, 2023");
        assert_eq!(format_date("2023-11-15 08:30:00"), "Nov 15, 2023");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
