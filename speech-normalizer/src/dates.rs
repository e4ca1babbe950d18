use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::vocabulary::{digit_for_word, months_longest_first, ordinal_value};

lazy_static! {
    static ref ISO_DATE: Regex = build(r"^\d{4}-\d{2}-\d{2}$");
    static ref NUMERIC_DATE: Regex = build(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})$");
    static ref ORDINAL_SUFFIX: Regex = build(r"(st|nd|rd|th)$");
    static ref SPLIT_COMPOUND_ORDINAL: Regex =
        build(r"\b(twenty|thirty)\s+(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth)\b");
    static ref PUNCTUATION: Regex = build(r"[,.]");
    static ref WHITESPACE: Regex = build(r"\s+");
    static ref MONTHS: Vec<(&'static str, u32)> = months_longest_first();
}

#[allow(clippy::expect_used)]
fn build(pattern: &str) -> Regex {
    Regex::new(pattern).expect("date pattern is valid")
}

/// Normalize a spoken or typed date of birth to `YYYY-MM-DD`.
///
/// Accepts ISO dates, numeric US dates (`MM/DD/YYYY`, `M-D-YY`, `MM.DD.YY`)
/// and spoken forms such as "March fourth 1982" or "4th of march, 82".
/// Two-digit years above 30 are read as 19xx, the rest as 20xx. Returns
/// `None` when no month is heard, when day or year is missing, or when the
/// result is not a real calendar date.
pub fn normalize_dob(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if ISO_DATE.is_match(trimmed) {
        return validated(trimmed.to_string());
    }

    if let Some(caps) = NUMERIC_DATE.captures(trimmed) {
        let month: u32 = caps.get(1)?.as_str().parse().ok()?;
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        let year = expand_year(caps.get(3)?.as_str());
        return validated(format!("{year}-{month:02}-{day:02}"));
    }

    parse_spoken(trimmed)
}

fn parse_spoken(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    let spaced = PUNCTUATION.replace_all(&lowered, " ");
    let collapsed = WHITESPACE.replace_all(spaced.trim(), " ");
    let text = SPLIT_COMPOUND_ORDINAL.replace_all(&collapsed, "$1-$2");

    let (month_name, month) = MONTHS.iter().find(|(name, _)| text.contains(name))?;
    let remainder = text.replacen(month_name, " ", 1);

    let mut day: Option<u32> = None;
    let mut year: Option<String> = None;
    for token in remainder.split_whitespace() {
        let stripped = ORDINAL_SUFFIX.replace(token, "");
        if let Some(ordinal) = ordinal_value(&stripped).or_else(|| ordinal_value(token)) {
            day = Some(ordinal);
        } else if let Some(digit) = digit_for_word(&stripped) {
            if day.is_none() {
                day = digit.to_digit(10);
            }
        } else if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
            let Ok(value) = stripped.parse::<u32>() else {
                continue;
            };
            if value > 31 || day.is_some() {
                year = Some(stripped.to_string());
            } else {
                day = Some(value);
            }
        }
    }

    match (day, year) {
        (Some(day), Some(year)) => validated(format!("{}-{month:02}-{day:02}", expand_year(&year))),
        _ => {
            debug!(month = *month, has_day = day.is_some(), "spoken date missing day or year");
            None
        }
    }
}

fn expand_year(year: &str) -> String {
    if year.len() != 2 {
        return year.to_string();
    }
    match year.parse::<u32>() {
        Ok(short) if short > 30 => format!("19{year}"),
        _ => format!("20{year}"),
    }
}

fn validated(iso: String) -> Option<String> {
    NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok().map(|_| iso)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_passes_through() {
        assert_eq!(normalize_dob("1982-03-04").as_deref(), Some("1982-03-04"));
    }

    #[test]
    fn test_numeric_formats() {
        assert_eq!(normalize_dob("03/04/82").as_deref(), Some("1982-03-04"));
        assert_eq!(normalize_dob("3-4-1982").as_deref(), Some("1982-03-04"));
        assert_eq!(normalize_dob("11.22.05").as_deref(), Some("2005-11-22"));
        assert_eq!(normalize_dob("01/12/30").as_deref(), Some("2030-01-12"));
    }

    #[test]
    fn test_spoken_forms() {
        assert_eq!(normalize_dob("March 4th, 1982").as_deref(), Some("1982-03-04"));
        assert_eq!(normalize_dob("march fourth 1982").as_deref(), Some("1982-03-04"));
        assert_eq!(normalize_dob("the 22nd of November 1990").as_deref(), Some("1990-11-22"));
        assert_eq!(normalize_dob("Aug. 15, 75").as_deref(), Some("1975-08-15"));
        assert_eq!(normalize_dob("may five 1968").as_deref(), Some("1968-05-05"));
    }

    #[test]
    fn test_compound_ordinal_split_by_stt() {
        assert_eq!(normalize_dob("june twenty first 1984").as_deref(), Some("1984-06-21"));
        assert_eq!(normalize_dob("October thirty-first 1960").as_deref(), Some("1960-10-31"));
    }

    #[test]
    fn test_unparseable_input() {
        assert_eq!(normalize_dob("not a date"), None);
        assert_eq!(normalize_dob(""), None);
        assert_eq!(normalize_dob("march 1982"), None);
        assert_eq!(normalize_dob("02/30/1990"), None);
    }
}
