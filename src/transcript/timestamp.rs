//! Timestamp parsing and rendering across the two transcript dialects.
//!
//! The mic worker emits `HH:MM:SS.fff` timestamps, the speaker worker emits
//! `MM:SS.ff`. Everything is normalized to seconds internally and rendered
//! back out in one canonical `MM:SS.ff` form.

/// Parses a timestamp in either dialect into seconds.
///
/// Two `:` separators means `HH:MM:SS.fff`, one means `MM:SS.ff`. Any other
/// shape normalizes to 0.0 instead of failing; the line patterns upstream
/// guarantee well-formed input for anything that matters, and a transcript
/// parse must never abort on a single bad line.
pub fn parse_timestamp(ts: &str) -> f64 {
    fn num(part: &str) -> f64 {
        part.trim().parse().unwrap_or(0.0)
    }

    let parts: Vec<&str> = ts.split(':').collect();
    match parts.as_slice() {
        [h, m, s] => num(h) * 3600.0 + num(m) * 60.0 + num(s),
        [m, s] => num(m) * 60.0 + num(s),
        _ => 0.0,
    }
}

/// Renders seconds in the canonical `MM:SS.ff` form.
///
/// Minutes are unbounded rather than wrapped into hours, so long meetings
/// keep a single monotonic minute counter.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let rest = seconds - minutes as f64 * 60.0;
    format!("{minutes:02}:{rest:05.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hms_dialect() {
        assert_eq!(parse_timestamp("00:00:18.500"), 18.5);
        assert_eq!(parse_timestamp("01:02:03.000"), 3723.0);
    }

    #[test]
    fn test_parse_ms_dialect() {
        assert_eq!(parse_timestamp("00:06.00"), 6.0);
        assert_eq!(parse_timestamp("02:30.50"), 150.5);
    }

    #[test]
    fn test_parse_invalid_shapes_default_to_zero() {
        assert_eq!(parse_timestamp("123456"), 0.0);
        assert_eq!(parse_timestamp("1:2:3:4"), 0.0);
        assert_eq!(parse_timestamp(""), 0.0);
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format_timestamp(0.0), "00:00.00");
        assert_eq!(format_timestamp(6.0), "00:06.00");
        assert_eq!(format_timestamp(18.5), "00:18.50");
    }

    #[test]
    fn test_format_minutes_unbounded() {
        // 61 minutes 40 seconds stays in minutes, never wraps to hours
        assert_eq!(format_timestamp(3700.0), "61:40.00");
    }

    #[test]
    fn test_roundtrip_within_hundredths() {
        for input in [
            "00:00:00.000",
            "00:00:18.500",
            "01:15:42.330",
            "00:06.00",
            "59:59.99",
        ] {
            let secs = parse_timestamp(input);
            let rendered = format_timestamp(secs);
            let reparsed = parse_timestamp(&rendered);
            assert!(
                (secs - reparsed).abs() < 0.01,
                "roundtrip drift for {input}: {secs} vs {reparsed}"
            );
        }
    }
}
