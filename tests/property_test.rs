use proptest::prelude::*;
use urtwarden::core::commands::duration::{DEFAULT_SECS, TEMPBAN_MAX_SECS, parse_duration};
use urtwarden::core::game::names::{MAX_NAME_LEN, sanitize};

proptest! {
    /// Canonicalisation is a fixed point and its output honours every
    /// invariant: no whitespace, no color codes, bounded length.
    #[test]
    fn sanitize_is_idempotent(raw in "\\PC{0,40}") {
        let once = sanitize(&raw);
        prop_assert_eq!(sanitize(&once), once.clone());
        prop_assert!(once.chars().count() <= MAX_NAME_LEN);
        prop_assert!(!once.chars().any(char::is_whitespace));
        let bytes: Vec<char> = once.chars().collect();
        for pair in bytes.windows(2) {
            prop_assert!(!(pair[0] == '^' && pair[1].is_ascii_digit()));
        }
    }

    /// Names built from color codes and whitespace around a clean core
    /// reduce to the core.
    #[test]
    fn sanitize_strips_decorations(core in "[a-zA-Z]{1,10}", color in 0u8..10) {
        let raw = format!("  ^{color}{core} ^{color}");
        prop_assert_eq!(sanitize(&raw), core);
    }

    /// The duration parser is total: every input yields a positive number
    /// of seconds within the clamp.
    #[test]
    fn duration_parse_is_total(input in "\\PC{0,12}") {
        let (secs, human) = parse_duration(&input, TEMPBAN_MAX_SECS);
        prop_assert!(secs >= 1);
        prop_assert!(secs <= TEMPBAN_MAX_SECS);
        prop_assert!(!human.is_empty());
    }

    /// Well-formed inputs scale linearly with their unit until the clamp.
    #[test]
    fn duration_parse_units(n in 1u64..1000, unit in prop::sample::select(vec!['s', 'm', 'h', 'd'])) {
        let factor = match unit {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            _ => 1,
        };
        let (secs, _) = parse_duration(&format!("{n}{unit}"), TEMPBAN_MAX_SECS);
        prop_assert_eq!(secs, (n * factor).min(TEMPBAN_MAX_SECS));
    }

    /// Inputs without a unit suffix always fall back to the default.
    #[test]
    fn duration_bare_numbers_default(n in 0u64..100_000) {
        let (secs, _) = parse_duration(&n.to_string(), TEMPBAN_MAX_SECS);
        prop_assert_eq!(secs, DEFAULT_SECS);
    }
}
