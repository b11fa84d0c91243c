//! Fixed-width human-readable rendering of raw progress numbers.

/// Speed shown while no transfer is active (initial state and the
/// already-downloaded skip case).
pub const IDLE_SPEED: &str = "-- KiB/s";

const UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Renders a second count as `MM:SS` under one hour, `HH:MM:SS` under 100
/// hours, and `--:--:--` beyond that. Fractional input is floored; NaN and
/// negative values clamp to zero instead of panicking.
pub fn format_duration(total_seconds: f64) -> String {
    let total = total_seconds.floor() as u64;
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 99 {
        return "--:--:--".to_string();
    }
    if hours == 0 {
        format!("{:02}:{:02}", minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}

/// Renders a byte count with a base-1024 unit chosen so the scaled value
/// falls in `[1, 1024)` when possible. `None` renders as `N/A`, zero as
/// `0.00B`.
pub fn format_size(bytes: Option<f64>) -> String {
    let Some(bytes) = bytes else {
        return "N/A".to_string();
    };
    let mut exponent = 0;
    let mut scaled = bytes;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }
    format!("{:.2}{}", scaled, UNITS[exponent])
}

/// Renders a transfer rate right-justified to 10 columns, `---b/s` when the
/// rate is unknown.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        None => format!("{:>10}", "---b/s"),
        Some(rate) => format!("{:>10}", format!("{}/s", format_size(Some(rate)))),
    }
}
