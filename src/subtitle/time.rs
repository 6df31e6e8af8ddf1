//! Timestamp formatting shared by SRT/VTT parsing and oracle prompt text.

/// Convert seconds to `HH:MM:SS,mmm`.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    let ms = ((seconds.fract()) * 1000.0).round() as u64;
    format!("{hours:02}:{minutes:02}:{secs:02},{ms:03}")
}

/// Parse `HH:MM:SS,mmm` or `HH:MM:SS` (comma/period interchangeable) back
/// to seconds. Inverse of `seconds_to_timestamp` for well-formed input.
pub fn timestamp_to_seconds(timestamp: &str) -> Option<f64> {
    let normalized = timestamp.replace(',', ".");
    let (hms, ms) = match normalized.split_once('.') {
        Some((hms, ms)) => (hms, Some(ms)),
        None => (normalized.as_str(), None),
    };

    let mut parts = hms.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    let millis: f64 = match ms {
        Some(m) => format!("0.{m}").parse().ok()?,
        None => 0.0,
    };

    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_well_formed_timestamp() {
        let s = "01:02:03,456";
        let seconds = timestamp_to_seconds(s).unwrap();
        assert_eq!(seconds_to_timestamp(seconds), s);
    }

    #[test]
    fn round_trip_zero() {
        assert_eq!(seconds_to_timestamp(0.0), "00:00:00,000");
        assert_eq!(timestamp_to_seconds("00:00:00,000"), Some(0.0));
    }

    #[test]
    fn parses_without_milliseconds() {
        assert_eq!(timestamp_to_seconds("00:01:05"), Some(65.0));
    }

    #[test]
    fn accepts_period_separator() {
        assert_eq!(
            timestamp_to_seconds("00:01:05.500"),
            timestamp_to_seconds("00:01:05,500")
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(timestamp_to_seconds("not-a-timestamp"), None);
    }
}
