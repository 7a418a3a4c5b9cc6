//! Human-readable durations and timestamps.

/// `MM:SS` countdown display. Minutes grow past 59 rather than wrapping.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Accumulated focus time: `1h 5m` or `5m`.
pub fn format_work_time(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Like [`format_work_time`] but shows seconds for sub-minute spans.
pub fn format_duration_short(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else {
        format_work_time(secs)
    }
}

/// Age of a timestamp: `just now`, `5m ago`, `3h ago`, `2d ago`.
///
/// Timestamps in the future read as `just now`.
pub fn relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let elapsed_secs = (now_ms - timestamp_ms).max(0) / 1000;
    match elapsed_secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}
