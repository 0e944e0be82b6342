//! Progress grammar for encoder output.
//!
//! The encoder reports elapsed media time as `time=HH:MM:SS.fraction`
//! (or `out_time=...` in `-progress` mode). Anything else on a line is noise.

use regex::Regex;
use std::sync::LazyLock;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("invalid time regex")
});

/// Highest percentage a running job may report. 100 belongs to the terminal event.
pub const MAX_RUNNING_PERCENT: u8 = 99;

/// Elapsed seconds carried by a line, if it has a time marker.
pub fn parse_elapsed(line: &str) -> Option<f64> {
    let caps = TIME_RE.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// `min(99, round(elapsed / total * 100))`; `None` when the total is unusable.
pub fn percent_complete(elapsed: f64, total: f64) -> Option<u8> {
    if !total.is_finite() || total <= 0.0 || !elapsed.is_finite() {
        return None;
    }
    let percent = (elapsed.max(0.0) / total * 100.0).round();
    Some(percent.min(MAX_RUNNING_PERCENT as f64) as u8)
}

/// Parses the probe's `format=duration` output (a bare number of seconds).
pub fn parse_duration(output: &str) -> Option<f64> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .and_then(|l| l.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}
