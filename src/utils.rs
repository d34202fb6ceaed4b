/// Utility functions for data processing and formatting
use time::macros::format_description;
use time::OffsetDateTime;

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC
///
/// Falls back to the default string representation if formatting fails.
pub fn format_timestamp(dt: &OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let utc = dt.to_offset(time::UtcOffset::UTC);
    utc.format(&format).unwrap_or_else(|_| utc.to_string())
}

/// Format raw seconds since the Unix epoch, empty string when out of range
pub fn format_unix_seconds(seconds: u32) -> String {
    OffsetDateTime::from_unix_timestamp(i64::from(seconds))
        .map(|dt| format_timestamp(&dt))
        .unwrap_or_default()
}

/// Round to `decimals` places
///
/// Rounds the exact binary value, so `21.15` (stored slightly below) gives
/// `21.1`. Exact ties go to even.
pub fn round_decimals(value: f64, decimals: u32) -> f64 {
    if decimals == 0 || !value.is_finite() {
        return value.round_ties_even();
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Round a TVOC concentration for display
///
/// Small concentrations keep more decimals: 3 below 0.01 ppm, 2 below 1 ppm,
/// 1 otherwise.
pub fn round_voc_ppm(value: f64) -> f64 {
    if value < 0.01 {
        round_decimals(value, 3)
    } else if value < 1.0 {
        round_decimals(value, 2)
    } else {
        round_decimals(value, 1)
    }
}

/// Parse `MAJOR.MINOR.PATCH[-suffix]`, missing or non-numeric components read as 0
pub fn parse_firmware_version(fw: &str) -> (u32, u32, u32) {
    let main_part = fw.split('-').next().unwrap_or_default();
    let mut components = main_part
        .split('.')
        .map(|c| c.trim().parse::<u32>().unwrap_or(0));
    let major = components.next().unwrap_or(0);
    let minor = components.next().unwrap_or(0);
    let patch = components.next().unwrap_or(0);
    (major, minor, patch)
}

/// Whether firmware `fw` is at least `demanded`, false for a missing version
pub fn firmware_at_least(fw: Option<&str>, demanded: (u32, u32, u32)) -> bool {
    match fw {
        Some(fw) if !fw.trim().is_empty() => parse_firmware_version(fw.trim()) >= demanded,
        _ => false,
    }
}
