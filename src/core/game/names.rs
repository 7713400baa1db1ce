// src/core/game/names.rs

//! Canonical display names.
//!
//! Every name observed in the log goes through [`sanitize`] before it is
//! stored or printed: whitespace is removed, `^<digit>` color codes are
//! stripped and the result is clipped to 20 characters. The function is a
//! fixed point: `sanitize(sanitize(x)) == sanitize(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

static COLOR_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\d").expect("static regex"));

pub const MAX_NAME_LEN: usize = 20;

/// Canonicalises a raw player name from the log or the database.
pub fn sanitize(raw: &str) -> String {
    let mut name: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    // A single replace pass can leave a new `^<digit>` pair behind
    // (e.g. `^^11`), so strip until stable.
    loop {
        let stripped = COLOR_CODE.replace_all(&name, "").into_owned();
        if stripped == name {
            break;
        }
        name = stripped;
    }
    if name.chars().count() > MAX_NAME_LEN {
        name = name.chars().take(MAX_NAME_LEN).collect();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_codes_and_whitespace() {
        assert_eq!(sanitize("^1Red ^4Baron"), "RedBaron");
        assert_eq!(sanitize("  plain  "), "plain");
    }

    #[test]
    fn nested_codes_are_removed() {
        assert_eq!(sanitize("^^11nested"), "nested");
    }

    #[test]
    fn clips_to_twenty_chars() {
        let long = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(sanitize(long).chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn idempotent() {
        for raw in ["^1a b^2c", "^^11x", "plain", "  ^9  "] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once);
        }
    }
}
