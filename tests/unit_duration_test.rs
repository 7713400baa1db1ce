use urtwarden::core::commands::duration::{
    PERMBAN_MAX_SECS, TEMPBAN_MAX_SECS, humanize, parse_duration,
};

#[test]
fn test_hour_suffix() {
    assert_eq!(
        parse_duration("2h", TEMPBAN_MAX_SECS),
        (7200, "2 hours".to_string())
    );
}

#[test]
fn test_minute_suffix_crossing_an_hour() {
    assert_eq!(
        parse_duration("90m", TEMPBAN_MAX_SECS),
        (5400, "1 hour 30 minutes".to_string())
    );
}

#[test]
fn test_empty_input_defaults() {
    assert_eq!(
        parse_duration("", TEMPBAN_MAX_SECS),
        (3600, "1 hour".to_string())
    );
}

#[test]
fn test_missing_unit_defaults() {
    assert_eq!(
        parse_duration("20", TEMPBAN_MAX_SECS),
        (3600, "1 hour".to_string())
    );
}

#[test]
fn test_tempban_cap() {
    let (secs, human) = parse_duration("999d", TEMPBAN_MAX_SECS);
    assert_eq!(secs, 259_200);
    assert_eq!(human, "3 days");
}

#[test]
fn test_permban_cap_is_twenty_years() {
    let (secs, _) = parse_duration("9999d", PERMBAN_MAX_SECS);
    assert_eq!(secs, PERMBAN_MAX_SECS);
}

#[test]
fn test_day_and_second_suffixes() {
    assert_eq!(
        parse_duration("2d", TEMPBAN_MAX_SECS),
        (172_800, "2 days".to_string())
    );
    assert_eq!(
        parse_duration("45s", TEMPBAN_MAX_SECS),
        (45, "45 seconds".to_string())
    );
}

#[test]
fn test_garbage_inputs_default() {
    for input in ["xh", "-5m", "h", "two hours"] {
        assert_eq!(parse_duration(input, TEMPBAN_MAX_SECS).0, 3600, "{input}");
    }
}

#[test]
fn test_humanize_composition() {
    assert_eq!(humanize(93_784), "1 day 2 hours 3 minutes 4 seconds");
    assert_eq!(humanize(0), "0 seconds");
}
