use crate::vocabulary::{canonical_first_name, letter_for_sound, nicknames_of};

/// How a spoken first name is compared against stored first names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstNameMatcher {
    /// Caller gave only an initial, possibly spoken as a letter sound ("jay")
    Initial(char),
    /// Exact, case-insensitive match against any of these lowercase names
    AnyOf(Vec<String>),
}

impl FirstNameMatcher {
    /// Build the matcher for a single lowercase first-name token
    pub fn from_token(token: &str) -> Self {
        let mut chars = token.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            return FirstNameMatcher::Initial(letter);
        }
        if let Some(letter) = letter_for_sound(token) {
            return FirstNameMatcher::Initial(letter);
        }

        let mut names = vec![token.to_string()];
        if let Some(canonical) = canonical_first_name(token) {
            names.push(canonical.to_string());
        }
        names.extend(nicknames_of(token).map(str::to_string));
        FirstNameMatcher::AnyOf(names)
    }

    pub fn matches(&self, first_name: &str) -> bool {
        let candidate = first_name.trim().to_lowercase();
        match self {
            FirstNameMatcher::Initial(letter) => candidate.starts_with(*letter),
            FirstNameMatcher::AnyOf(names) => names.iter().any(|name| *name == candidate),
        }
    }
}

/// A spoken full name reduced to what the member search needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenName {
    pub first: FirstNameMatcher,
    /// Lowercase last name, matched exactly
    pub last: String,
}

impl SpokenName {
    /// Split "first [middle...] last" into matchers.
    ///
    /// Returns `None` for fewer than two tokens; a single name is too weak to
    /// search on.
    pub fn parse(full_name: &str) -> Option<Self> {
        let parts: Vec<&str> = full_name.split_whitespace().collect();
        if parts.len() < 2 {
            return None;
        }
        let first = parts.first()?.to_lowercase();
        let first = first.trim_end_matches('.');
        let last = parts.last()?.to_lowercase();

        Some(Self {
            first: FirstNameMatcher::from_token(first),
            last,
        })
    }

    pub fn matches(&self, first_name: &str, last_name: &str) -> bool {
        last_name.trim().to_lowercase() == self.last && self.first.matches(first_name)
    }
}
