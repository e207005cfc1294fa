//! Case- and accent-insensitive text ordering.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Ordering key for display text.
///
/// The primary level folds case and drops diacritics, so `Éclair` sorts
/// between `apple` and `zebra`. The secondary level keeps accented forms
/// after their bare spelling when the primary levels tie.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    secondary: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let primary = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
        Self {
            primary,
            secondary: lowered.nfc().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collated<'a>(mut words: Vec<&'a str>) -> Vec<&'a str> {
        words.sort_by_key(|w| CollationKey::new(w));
        words
    }

    #[test]
    fn accented_words_sort_with_their_base_letter() {
        assert_eq!(
            collated(vec!["zebra", "Éclair", "apple"]),
            vec!["apple", "Éclair", "zebra"]
        );
    }

    #[test]
    fn bare_spelling_precedes_accented_on_tie() {
        assert_eq!(collated(vec!["éclair", "Eclair"]), vec!["Eclair", "éclair"]);
        assert_eq!(CollationKey::new("ABC"), CollationKey::new("abc"));
    }

    #[test]
    fn composed_and_decomposed_forms_are_equal() {
        assert_eq!(CollationKey::new("caf\u{e9}"), CollationKey::new("cafe\u{301}"));
    }
}
