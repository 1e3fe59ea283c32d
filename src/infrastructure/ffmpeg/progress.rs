//! Fractional completion derived from ffmpeg's live stderr output.

use regex::Regex;
use std::sync::LazyLock;

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=(\d+):(\d+):(\d+\.\d+)").expect("invalid time regex"));

/// Extract the `time=HH:MM:SS.frac` stamp from one output line as elapsed
/// seconds. Lines without a parseable stamp return `None` and are ignored.
pub fn parse_timestamp(line: &str) -> Option<f64> {
    let caps = TIME_RE.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Percentage for a known total duration, capped at 99: 100 is reserved for
/// a subprocess that actually exited successfully. Unknown or non-positive
/// duration means progress cannot be computed.
pub fn percent(elapsed_seconds: f64, duration_seconds: Option<f64>) -> Option<u8> {
    let duration = duration_seconds.filter(|d| *d > 0.0)?;
    let pct = ((elapsed_seconds / duration) * 100.0).floor() as i64;
    Some(pct.clamp(0, 99) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_parsed_from_stats_line() {
        let line = "frame= 2160 fps=120 q=28.0 size=10240KiB time=00:01:30.50 bitrate= 926kbits/s";
        assert_eq!(parse_timestamp(line), Some(90.5));
    }

    #[test]
    fn hours_counted() {
        assert_eq!(parse_timestamp("time=01:02:03.00"), Some(3723.0));
    }

    #[test]
    fn garbage_lines_ignored() {
        assert_eq!(parse_timestamp("Press [q] to stop, [?] for help"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn thirty_percent_of_five_minutes() {
        let elapsed = parse_timestamp("time=00:01:30.50").unwrap();
        assert_eq!(percent(elapsed, Some(300.0)), Some(30));
    }

    #[test]
    fn capped_below_completion() {
        assert_eq!(percent(299.9, Some(300.0)), Some(99));
        assert_eq!(percent(400.0, Some(300.0)), Some(99));
    }

    #[test]
    fn unknown_duration_yields_nothing() {
        assert_eq!(percent(90.5, None), None);
        assert_eq!(percent(90.5, Some(0.0)), None);
    }
}
