//! Contact number hyphenation.
//!
//! Seoul numbers (`02`) have a two-digit area code; everything else is
//! grouped as a three-digit prefix. The rules also give sensible output for
//! numbers that are still being typed.

/// Keep only ASCII digits
pub fn strip_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Hyphenate a contact number.
///
/// - `02` + 7 digits → `02-XXX-XXXX`, `02` + 8 digits → `02-XXXX-XXXX`
/// - 11 digits → `XXX-XXXX-XXXX`, 10 digits → `XXX-XXX-XXXX`
/// - 8 digits (e.g. `1588`) → `XXXX-XXXX`
pub fn format_phone(raw: &str) -> String {
    let digits = strip_digits(raw);
    let len = digits.len();

    if digits.starts_with("02") {
        return match len {
            0..=2 => digits,
            3..=5 => format!("02-{}", &digits[2..]),
            6..=9 => format!("02-{}-{}", &digits[2..5], &digits[5..]),
            _ => format!("02-{}-{}", &digits[2..6], &digits[6..]),
        };
    }

    match len {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        8 => format!("{}-{}", &digits[..4], &digits[4..]),
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
    }
}
