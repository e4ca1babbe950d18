use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::digits::{digits_only, normalize_digit_string};
use crate::vocabulary::CLAIM_PREFIX_FIXES;

lazy_static! {
    static ref CANONICAL_CLAIM: Regex = build_claim_regex();
}

#[allow(clippy::expect_used)]
fn build_claim_regex() -> Regex {
    Regex::new(r"^CLM-?\d+$").expect("claim pattern is valid")
}

const CLAIM_PREFIX: &str = "CLM";
const CLAIM_DIGITS: usize = 8;

/// Rebuild a claim number in the canonical `CLM-########` form.
///
/// Misheard prefixes (`CLN`, `KLM`, the whole word "claim", ...) are repaired
/// first. When the digit payload is present but the prefix is beyond repair,
/// the digits are zero-padded to eight behind a fresh `CLM-`. Spoken digits
/// are used when no literal digit was transcribed. If nothing numeric can be
/// recovered the cleaned, uppercased input comes back as-is and will simply
/// not match anything.
pub fn normalize_claim_number(raw: &str) -> String {
    let mut cleaned: String = raw.to_uppercase().split_whitespace().collect();

    if let Some((good, rest)) = CLAIM_PREFIX_FIXES
        .iter()
        .find_map(|(bad, good)| cleaned.strip_prefix(bad).map(|rest| (good, rest)))
    {
        cleaned = format!("{good}{rest}");
    }

    if CANONICAL_CLAIM.is_match(&cleaned) {
        let digits = cleaned.trim_start_matches(CLAIM_PREFIX).trim_start_matches('-');
        return format!("{CLAIM_PREFIX}-{digits}");
    }

    let mut digits = digits_only(&cleaned);
    if digits.is_empty() {
        digits = normalize_digit_string(raw);
    }
    if digits.is_empty() {
        debug!("claim number has no recoverable digits");
        return cleaned;
    }

    format!("{CLAIM_PREFIX}-{digits:0>width$}", width = CLAIM_DIGITS)
}
