// src/core/commands/duration.rs

//! Ban duration strings: `3d`, `12h`, `90m`, `45s`. Total function with an
//! explicit default and an upper clamp supplied by the caller.

/// One hour, the fallback for empty or unparseable inputs.
pub const DEFAULT_SECS: u64 = 3600;

/// Upper clamp for `!tempban`.
pub const TEMPBAN_MAX_SECS: u64 = 72 * 3600;
/// Upper clamp for `!permban`.
pub const PERMBAN_MAX_SECS: u64 = 20 * 365 * 24 * 3600;

/// Parses a duration string and returns `(seconds, human readable)`.
/// A bare number without a unit suffix falls back to the default.
pub fn parse_duration(input: &str, max_secs: u64) -> (u64, String) {
    let trimmed = input.trim();
    let secs = match trimmed.char_indices().last() {
        Some((idx, unit @ ('d' | 'h' | 'm' | 's'))) => {
            let factor = match unit {
                'd' => 86400,
                'h' => 3600,
                'm' => 60,
                _ => 1,
            };
            trimmed[..idx]
                .parse::<u64>()
                .ok()
                .map(|n| n.saturating_mul(factor))
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_SECS)
        }
        _ => DEFAULT_SECS,
    };
    let clamped = secs.min(max_secs.max(1));
    (clamped, humanize(clamped))
}

/// `5400` -> `1 hour 30 minutes`.
pub fn humanize(mut secs: u64) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut push = |n: u64, one: &str, many: &str| {
        if n == 1 {
            parts.push(format!("1 {one}"));
        } else if n > 1 {
            parts.push(format!("{n} {many}"));
        }
    };
    push(secs / 86400, "day", "days");
    secs %= 86400;
    push(secs / 3600, "hour", "hours");
    secs %= 3600;
    push(secs / 60, "minute", "minutes");
    secs %= 60;
    push(secs, "second", "seconds");
    if parts.is_empty() {
        return "0 seconds".to_string();
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_and_minutes() {
        assert_eq!(
            parse_duration("2h", TEMPBAN_MAX_SECS),
            (7200, "2 hours".to_string())
        );
        assert_eq!(
            parse_duration("90m", TEMPBAN_MAX_SECS),
            (5400, "1 hour 30 minutes".to_string())
        );
    }

    #[test]
    fn empty_defaults_to_one_hour() {
        assert_eq!(
            parse_duration("", TEMPBAN_MAX_SECS),
            (3600, "1 hour".to_string())
        );
    }

    #[test]
    fn bare_number_defaults() {
        assert_eq!(
            parse_duration("20", TEMPBAN_MAX_SECS),
            (3600, "1 hour".to_string())
        );
    }

    #[test]
    fn clamped_to_max() {
        assert_eq!(
            parse_duration("999d", TEMPBAN_MAX_SECS),
            (259_200, "3 days".to_string())
        );
    }

    #[test]
    fn seconds_and_days() {
        assert_eq!(
            parse_duration("45s", TEMPBAN_MAX_SECS),
            (45, "45 seconds".to_string())
        );
        assert_eq!(
            parse_duration("2d", TEMPBAN_MAX_SECS),
            (172_800, "2 days".to_string())
        );
    }

    #[test]
    fn zero_falls_back() {
        assert_eq!(
            parse_duration("0m", TEMPBAN_MAX_SECS),
            (3600, "1 hour".to_string())
        );
    }
}
