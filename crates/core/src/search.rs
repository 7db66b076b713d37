//! Normalized search term and the class-name predicate.

use std::fmt;

/// A lower-cased search term. Empty matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Normalize a raw, possibly absent, user-entered term.
    pub fn new(raw: Option<&str>) -> Self {
        Self(downcase(raw.unwrap_or_default()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive substring test against a class name.
    ///
    /// Always false for the empty term.
    pub fn matches(&self, class_name: &str) -> bool {
        !self.is_empty() && downcase(class_name).contains(&self.0)
    }
}

/// Per-character lower-casing.
///
/// `str::to_lowercase` maps a word-final `Σ` to `ς`, so the same letter could
/// fold differently in the term and in the class name.
fn downcase(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

impl From<&str> for SearchTerm {
    fn from(raw: &str) -> Self {
        Self::new(Some(raw))
    }
}

impl From<Option<&str>> for SearchTerm {
    fn from(raw: Option<&str>) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absent_term_is_empty() {
        assert!(SearchTerm::new(None).is_empty());
        assert!(!SearchTerm::new(None).matches("SendEmail"));
    }

    #[test]
    fn stored_lower_cased() {
        assert_eq!(SearchTerm::from("SENDEmail").as_str(), "sendemail");
    }

    #[test]
    fn case_mismatched_exact_name_matches() {
        assert!(SearchTerm::from("SENDEMAIL").matches("SendEmail"));
        assert!(SearchTerm::from("email").matches("SendEmail"));
        assert!(!SearchTerm::from("report").matches("SendEmail"));
    }

    #[test]
    fn final_sigma_folds_like_any_sigma() {
        assert!(SearchTerm::from("Σ").matches("ΟΔΟΣ"));
        assert!(SearchTerm::from("ΟΔΟΣ").matches("οδοσ"));
        assert_eq!(SearchTerm::from("ΟΔΟΣ").as_str(), "οδοσ");
    }

    proptest! {
        #[test]
        fn any_substring_of_a_class_matches(
            class in "[A-Za-z:]{1,24}",
            start in 0usize..24,
            len in 1usize..24,
        ) {
            let start = start % class.len();
            let end = (start + len).min(class.len());
            let term = SearchTerm::from(&class[start..end].to_uppercase()[..]);
            prop_assert!(term.matches(&class));
        }

        #[test]
        fn empty_term_never_matches(class in ".*") {
            prop_assert!(!SearchTerm::from("").matches(&class));
        }
    }
}
