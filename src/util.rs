use chrono::Duration;

const MICROS_PER_SEC: i64 = 1_000_000;

/// Seconds as a float, used for the two-decimal split columns
pub fn secs_f64(d: Duration) -> f64 {
    match d.num_microseconds() {
        Some(us) => us as f64 / MICROS_PER_SEC as f64,
        None => d.num_milliseconds() as f64 / 1000.0,
    }
}

/// Renders `HH:MM:SS.ffffff`. Hours are not wrapped at 24 and negative
/// durations clamp to zero.
pub fn format_hms_micros(d: Duration) -> String {
    let total = d.num_microseconds().unwrap_or(i64::MAX).max(0);
    let (secs, micros) = (total / MICROS_PER_SEC, total % MICROS_PER_SEC);
    let (mins, secs) = (secs / 60, secs % 60);
    let (hours, mins) = (mins / 60, mins % 60);

    format!("{hours:02}:{mins:02}:{secs:02}.{micros:06}")
}

/// Renders `HH:MM:SS.mmm` for the big clock
pub fn format_clock(d: Duration) -> String {
    let total = d.num_milliseconds().max(0);
    let (secs, millis) = (total / 1000, total % 1000);
    let (mins, secs) = (secs / 60, secs % 60);
    let (hours, mins) = (mins / 60, mins % 60);

    format!("{hours:02}:{mins:02}:{secs:02}.{millis:03}")
}
