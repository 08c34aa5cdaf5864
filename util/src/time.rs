//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if the nanosecond count overflows.
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Number of whole cycles of `period_s` that fit in one second, never less than one.
pub fn cycles_per_second(period_s: f64) -> u64 {
    let n = (1.0 / period_s).round();
    if n.is_finite() && n >= 1.0 {
        n as u64
    } else {
        1
    }
}
