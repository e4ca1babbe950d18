use lazy_static::lazy_static;
use regex::Regex;

use crate::vocabulary::digit_for_word;

lazy_static! {
    static ref TOKEN_SEPARATORS: Regex = build_separator_regex();
}

#[allow(clippy::expect_used)]
fn build_separator_regex() -> Regex {
    Regex::new(r"[\s,\-]+").expect("separator pattern is valid")
}

/// Turn a spoken or partially spoken digit sequence into bare digits.
///
/// Input that is already numeric once separators are removed comes back
/// unchanged apart from the separators. Otherwise each token is mapped through
/// the spoken-digit table, literal numeric tokens are kept as-is, and
/// anything unrecognized is dropped. Used for NPIs, zip codes and member
/// phone numbers.
///
/// ```rust
/// use speech_normalizer::normalize_digit_string;
///
/// assert_eq!(normalize_digit_string("555-123-4567"), "5551234567");
/// assert_eq!(normalize_digit_string("nine oh two one oh"), "90210");
/// ```
pub fn normalize_digit_string(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let compact: String = lowered
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')' | '.'))
        .collect();
    if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
        return compact;
    }

    let mut digits = String::with_capacity(lowered.len());
    for token in TOKEN_SEPARATORS.split(&lowered) {
        let token = token.trim_end_matches('.');
        if token.is_empty() {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            digits.push_str(token);
        } else if let Some(digit) = digit_for_word(token) {
            digits.push(digit);
        }
    }
    digits
}

/// Digits only, in order, ignoring every other character
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// First five digits of a spoken zip code, or `None` when fewer are heard
pub fn normalize_zip(raw: &str) -> Option<String> {
    let digits = normalize_digit_string(raw);
    if digits.len() < 5 {
        return None;
    }
    Some(digits.chars().take(5).collect())
}
