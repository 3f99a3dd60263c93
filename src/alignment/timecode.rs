/// `MM:SS` position, truncated to the whole second. Minutes are not wrapped
/// into hours.
pub fn format_timestamp(seconds: f64) -> String {
    format_seconds(clamp_seconds(seconds).floor())
}

/// `MM:SS` length, rounded to the nearest second.
pub fn format_duration(seconds: f64) -> String {
    format_seconds(clamp_seconds(seconds).round())
}

fn clamp_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

fn format_seconds(whole: f64) -> String {
    let total = whole as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Seconds needed to read `word_count` words at `words_per_minute`.
pub fn estimated_read_seconds(word_count: usize, words_per_minute: f64) -> f64 {
    if words_per_minute > 0.0 {
        word_count as f64 * 60.0 / words_per_minute
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(59.9), "00:59");
        assert_eq!(format_timestamp(61.2), "01:01");
        assert_eq!(format_timestamp(3725.0), "62:05");
        assert_eq!(format_timestamp(-4.0), "00:00");
        assert_eq!(format_timestamp(f64::NAN), "00:00");
    }

    #[test]
    fn durations_round() {
        assert_eq!(format_duration(59.6), "01:00");
        assert_eq!(format_duration(6.0), "00:06");
        assert_eq!(format_duration(0.4), "00:00");
    }

    #[test]
    fn read_time_at_default_pace() {
        assert_eq!(estimated_read_seconds(15, 150.0), 6.0);
        assert_eq!(estimated_read_seconds(150, 150.0), 60.0);
        assert_eq!(estimated_read_seconds(10, 0.0), 0.0);
    }
}
