use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Number of bytes in one megabyte
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let random = rand::random::<u32>();
    format!("req_{timestamp:x}_{random:x}")
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{millis}ms")
    } else if total_secs < 60 {
        format!("{total_secs}.{millis:03}s")
    } else if total_secs < 3600 {
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{minutes}m {seconds}s")
    } else {
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        format!("{hours}h {minutes}m {seconds}s")
    }
}

/// Round a value to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a byte count to megabytes, rounded to two decimal places
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_MB as f64)
}

/// Milliseconds elapsed over a duration, rounded to two decimal places
pub fn duration_ms(duration: Duration) -> f64 {
    round2(duration.as_secs_f64() * 1000.0)
}

/// Current UTC time as an ISO-8601 string
pub fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
