use twilight_model::id::{
    marker::{ChannelMarker, UserMarker},
    Id,
};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Parse a target user from a raw argument (`<@id>`, `<@!id>`, or raw ID).
pub fn parse_target_user_id(raw: &str) -> Option<Id<UserMarker>> {
    let trimmed = raw.trim();

    let numeric = if trimmed.starts_with("<@") && trimmed.ends_with('>') {
        let without_wrappers = trimmed.strip_prefix("<@")?.strip_suffix('>')?;
        without_wrappers
            .strip_prefix('!')
            .unwrap_or(without_wrappers)
    } else {
        trimmed
    };

    let id = numeric.parse::<u64>().ok()?;
    if id == 0 {
        return None;
    }

    Some(Id::new(id))
}

/// Parse a target channel from a raw argument (`<#id>` or raw ID).
pub fn parse_target_channel_id(raw: &str) -> Option<Id<ChannelMarker>> {
    let trimmed = raw.trim();

    let numeric = if trimmed.starts_with("<#") && trimmed.ends_with('>') {
        trimmed.strip_prefix("<#")?.strip_suffix('>')?
    } else {
        trimmed
    };

    let id = numeric.parse::<u64>().ok()?;
    if id == 0 {
        return None;
    }

    Some(Id::new(id))
}

/// Parse a compact duration token like `30s`, `10m`, `2h`, or `1d` into
/// milliseconds.
///
/// The unit is mandatory and case-insensitive. A zero magnitude parses like
/// any other non-negative integer; the caller decides what to do with it.
pub fn parse_duration_ms(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let mut chars = value.chars();
    let unit = chars.next_back()?;

    let multiplier = match unit.to_ascii_lowercase() {
        's' => MS_PER_SECOND,
        'm' => MS_PER_MINUTE,
        'h' => MS_PER_HOUR,
        'd' => MS_PER_DAY,
        _ => return None,
    };

    let number = chars.as_str().parse::<u64>().ok()?;
    number.checked_mul(multiplier)
}

/// Render a millisecond count as the largest whole unit that fits.
///
/// Truncates the remainder, so `90m` formats as `1h`. Display only; never
/// feed the result back into scheduling.
pub fn format_duration_ms(ms: u64) -> String {
    if ms >= MS_PER_DAY {
        format!("{}d", ms / MS_PER_DAY)
    } else if ms >= MS_PER_HOUR {
        format!("{}h", ms / MS_PER_HOUR)
    } else if ms >= MS_PER_MINUTE {
        format!("{}m", ms / MS_PER_MINUTE)
    } else {
        format!("{}s", ms / MS_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mentions_and_raw_ids() {
        assert_eq!(parse_target_user_id("123456").map(Id::get), Some(123_456));
        assert_eq!(
            parse_target_user_id("<@123456>").map(Id::get),
            Some(123_456)
        );
        assert_eq!(
            parse_target_user_id("<@!123456>").map(Id::get),
            Some(123_456)
        );
        assert_eq!(parse_target_user_id("  <@99>  ").map(Id::get), Some(99));
    }

    #[test]
    fn rejects_non_ids() {
        assert!(parse_target_user_id("").is_none());
        assert!(parse_target_user_id("0").is_none());
        assert!(parse_target_user_id("@everyone").is_none());
        assert!(parse_target_user_id("<@abc>").is_none());
        assert!(parse_target_user_id("<#123>").is_none());
    }

    #[test]
    fn parses_channel_mentions() {
        assert_eq!(
            parse_target_channel_id("<#555>").map(Id::get),
            Some(555)
        );
        assert_eq!(parse_target_channel_id("555").map(Id::get), Some(555));
        assert!(parse_target_channel_id("<@555>").is_none());
    }

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration_ms("30s"), Some(30 * MS_PER_SECOND));
        assert_eq!(parse_duration_ms("10m"), Some(10 * MS_PER_MINUTE));
        assert_eq!(parse_duration_ms("2h"), Some(2 * MS_PER_HOUR));
        assert_eq!(parse_duration_ms("1d"), Some(MS_PER_DAY));
        assert_eq!(parse_duration_ms("2H"), Some(2 * MS_PER_HOUR));
        assert_eq!(parse_duration_ms("1D"), Some(MS_PER_DAY));
    }

    #[test]
    fn zero_magnitude_is_not_special_cased() {
        assert_eq!(parse_duration_ms("0s"), Some(0));
        assert_eq!(parse_duration_ms("0d"), Some(0));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration_ms("").is_none());
        assert!(parse_duration_ms("10").is_none());
        assert!(parse_duration_ms("m").is_none());
        assert!(parse_duration_ms("-5m").is_none());
        assert!(parse_duration_ms("1.5h").is_none());
        assert!(parse_duration_ms("10w").is_none());
        assert!(parse_duration_ms("ten minutes").is_none());
    }

    #[test]
    fn rejects_overflowing_durations() {
        assert!(parse_duration_ms("18446744073709551615d").is_none());
    }

    #[test]
    fn formats_largest_whole_unit() {
        assert_eq!(format_duration_ms(MS_PER_DAY), "1d");
        assert_eq!(format_duration_ms(36 * MS_PER_HOUR), "1d");
        assert_eq!(format_duration_ms(90 * MS_PER_MINUTE), "1h");
        assert_eq!(format_duration_ms(90 * MS_PER_SECOND), "1m");
        assert_eq!(format_duration_ms(45 * MS_PER_SECOND), "45s");
        assert_eq!(format_duration_ms(999), "0s");
    }

    #[test]
    fn format_is_lossy_but_bounded() {
        for token in ["2h", "1d", "90m", "61s", "25h"] {
            let original = parse_duration_ms(token).unwrap();
            let reparsed = parse_duration_ms(&format_duration_ms(original)).unwrap();
            assert!(reparsed <= original);
            assert!(reparsed > 0);
        }
    }
}
