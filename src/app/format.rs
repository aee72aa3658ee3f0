use std::time::Duration;

/// Render `seconds` as `m:ss`.
///
/// Minutes are `floor(seconds / 60)`; seconds are `seconds mod 60` rounded
/// half away from zero and capped at 59, so a value like 599.6 reads `9:59`
/// rather than `9:60`. Negative and non-finite input renders as `0:00`.
pub fn format_time_label(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = ((seconds % 60.0).round() as u64).min(59);
    format!("{minutes}:{secs:02}")
}

pub fn format_duration_label(d: Duration) -> String {
    format_time_label(d.as_secs_f64())
}
