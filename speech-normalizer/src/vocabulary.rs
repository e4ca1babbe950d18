//! Spoken-form vocabulary used by the normalizers and the member resolver
//!
//! Every table here is a static slice. Lookups are linear scans: the tables
//! are small, and keeping them as plain data keeps priority order explicit
//! where it matters (claim prefix fixes, service aliases).

/// Spoken digit words and common speech-to-text homophones
pub const DIGIT_WORDS: &[(&str, char)] = &[
    ("zero", '0'),
    ("oh", '0'),
    ("o", '0'),
    ("one", '1'),
    ("won", '1'),
    ("two", '2'),
    ("to", '2'),
    ("too", '2'),
    ("three", '3'),
    ("tree", '3'),
    ("four", '4'),
    ("for", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("niner", '9'),
];

/// Ordinal words for days of the month
pub const ORDINAL_WORDS: &[(&str, u32)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
    ("thirteenth", 13),
    ("fourteenth", 14),
    ("fifteenth", 15),
    ("sixteenth", 16),
    ("seventeenth", 17),
    ("eighteenth", 18),
    ("nineteenth", 19),
    ("twentieth", 20),
    ("twenty-first", 21),
    ("twenty-second", 22),
    ("twenty-third", 23),
    ("twenty-fourth", 24),
    ("twenty-fifth", 25),
    ("twenty-sixth", 26),
    ("twenty-seventh", 27),
    ("twenty-eighth", 28),
    ("twenty-ninth", 29),
    ("thirtieth", 30),
    ("thirty-first", 31),
];

/// Month names and abbreviations, full names first
pub const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Nickname to legal first name
pub const NICKNAMES: &[(&str, &str)] = &[
    ("bob", "robert"),
    ("bobby", "robert"),
    ("rob", "robert"),
    ("bill", "william"),
    ("billy", "william"),
    ("will", "william"),
    ("mike", "michael"),
    ("mikey", "michael"),
    ("pat", "patricia"),
    ("patty", "patricia"),
    ("tom", "thomas"),
    ("tommy", "thomas"),
    ("sue", "susan"),
    ("suzy", "susan"),
    ("dave", "david"),
    ("liz", "elizabeth"),
    ("beth", "elizabeth"),
    ("lizzy", "elizabeth"),
    ("jim", "james"),
    ("jimmy", "james"),
    ("jamie", "james"),
    ("jen", "jennifer"),
    ("jenny", "jennifer"),
    ("dan", "daniel"),
    ("danny", "daniel"),
    ("dick", "richard"),
    ("rick", "richard"),
    ("rich", "richard"),
    ("joe", "joseph"),
    ("joey", "joseph"),
    ("jon", "john"),
    ("johnny", "john"),
    ("chris", "christopher"),
    ("matt", "matthew"),
    ("matty", "matthew"),
    ("nick", "nicholas"),
    ("steve", "steven"),
    ("stevie", "steven"),
    ("tony", "anthony"),
    ("chuck", "charles"),
    ("charlie", "charles"),
    ("larry", "lawrence"),
    ("terry", "terence"),
    ("debbie", "deborah"),
    ("deb", "deborah"),
    ("kathy", "katherine"),
    ("kate", "katherine"),
    ("katie", "katherine"),
    ("maggie", "margaret"),
    ("meg", "margaret"),
    ("peggy", "margaret"),
    ("nancy", "ann"),
    ("sandy", "sandra"),
];

/// Letters as speech-to-text writes them when a caller spells an initial
pub const LETTER_SOUNDS: &[(&str, char)] = &[
    ("ay", 'a'),
    ("aye", 'a'),
    ("bee", 'b'),
    ("cee", 'c'),
    ("see", 'c'),
    ("sea", 'c'),
    ("dee", 'd'),
    ("ee", 'e'),
    ("eff", 'f'),
    ("gee", 'g'),
    ("aitch", 'h'),
    ("eye", 'i'),
    ("jay", 'j'),
    ("kay", 'k'),
    ("el", 'l'),
    ("elle", 'l'),
    ("ell", 'l'),
    ("em", 'm'),
    ("en", 'n'),
    ("oh", 'o'),
    ("pee", 'p'),
    ("que", 'q'),
    ("cue", 'q'),
    ("are", 'r'),
    ("ar", 'r'),
    ("es", 's'),
    ("ess", 's'),
    ("tee", 't'),
    ("you", 'u'),
    ("vee", 'v'),
    ("ex", 'x'),
    ("why", 'y'),
    ("zee", 'z'),
    ("zed", 'z'),
];

/// Misheard forms of the `CLM` claim prefix, checked in order against the
/// start of the cleaned claim string
pub const CLAIM_PREFIX_FIXES: &[(&str, &str)] = &[
    ("CLAIM", "CLM"),
    ("CLAM", "CLM"),
    ("CLIM", "CLM"),
    ("CLEM", "CLM"),
    ("CLN", "CLM"),
    ("CIM", "CLM"),
    ("CLW", "CLM"),
    ("CRM", "CLM"),
    ("KLM", "CLM"),
];

pub fn digit_for_word(word: &str) -> Option<char> {
    DIGIT_WORDS
        .iter()
        .find(|(spoken, _)| *spoken == word)
        .map(|(_, digit)| *digit)
}

pub fn ordinal_value(word: &str) -> Option<u32> {
    ORDINAL_WORDS
        .iter()
        .find(|(spoken, _)| *spoken == word)
        .map(|(_, day)| *day)
}

pub fn letter_for_sound(word: &str) -> Option<char> {
    LETTER_SOUNDS
        .iter()
        .find(|(sound, _)| *sound == word)
        .map(|(_, letter)| *letter)
}

/// Legal name for a nickname, if the word is one
pub fn canonical_first_name(nickname: &str) -> Option<&'static str> {
    NICKNAMES
        .iter()
        .find(|(nick, _)| *nick == nickname)
        .map(|(_, canonical)| *canonical)
}

/// Every nickname that maps to `canonical`
pub fn nicknames_of(canonical: &str) -> impl Iterator<Item = &'static str> + '_ {
    NICKNAMES
        .iter()
        .filter(move |(_, name)| *name == canonical)
        .map(|(nick, _)| *nick)
}

/// Month names ordered longest first, so "june" wins over "jun"
pub fn months_longest_first() -> Vec<(&'static str, u32)> {
    let mut months = MONTH_NAMES.to_vec();
    months.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homophones_map_to_digits() {
        assert_eq!(digit_for_word("oh"), Some('0'));
        assert_eq!(digit_for_word("won"), Some('1'));
        assert_eq!(digit_for_word("too"), Some('2'));
        assert_eq!(digit_for_word("for"), Some('4'));
        assert_eq!(digit_for_word("niner"), Some('9'));
        assert_eq!(digit_for_word("claim"), None);
    }

    #[test]
    fn test_nickname_lookup_both_directions() {
        assert_eq!(canonical_first_name("bobby"), Some("robert"));
        assert_eq!(canonical_first_name("robert"), None);

        let mut nicks: Vec<_> = nicknames_of("robert").collect();
        nicks.sort_unstable();
        assert_eq!(nicks, vec!["bob", "bobby", "rob"]);
    }

    #[test]
    fn test_months_sorted_longest_first() {
        let months = months_longest_first();
        let june = months.iter().position(|(m, _)| *m == "june");
        let jun = months.iter().position(|(m, _)| *m == "jun");
        assert!(june < jun, "full month name must be tried before its abbreviation");
        assert_eq!(months.first().map(|(m, _)| *m), Some("september"));
    }

    #[test]
    fn test_claim_prefix_fixes_try_longer_variants_first() {
        let claim = CLAIM_PREFIX_FIXES.iter().position(|(bad, _)| *bad == "CLAIM");
        let clam = CLAIM_PREFIX_FIXES.iter().position(|(bad, _)| *bad == "CLAM");
        assert!(claim < clam);
    }
}
