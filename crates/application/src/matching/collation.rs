//! String collation for sort checks.
//!
//! Uses the Unicode Collation Algorithm with the CLDR root table, with
//! punctuation and whitespace non-ignorable. Accents are secondary to base
//! letters and lowercase sorts before uppercase on an otherwise equal pair.

use std::cmp::Ordering;

use feruca::{Collator, Locale, Tailoring};

/// Root-locale collator, reused across the comparisons of one sort check.
pub struct Collation {
    collator: Collator,
}

impl Collation {
    /// Creates a root-locale collator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collator: Collator::new(Tailoring::Cldr(Locale::Root), false, true),
        }
    }

    /// Compares two strings by collation order.
    pub fn compare(&mut self, a: &str, b: &str) -> Ordering {
        self.collator.collate(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collate(a: &str, b: &str) -> Ordering {
        Collation::new().compare(a, b)
    }

    #[test]
    fn test_case_insensitive_primary_order() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Banana", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_first_on_tie() {
        assert_eq!(collate("apple", "Apple"), Ordering::Less);
        assert_eq!(collate("Apple", "apple"), Ordering::Greater);
        assert_eq!(collate("apple", "apple"), Ordering::Equal);
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(collate(" a", "1"), Ordering::Less);
        assert_eq!(collate("-x", "0"), Ordering::Less);
        assert_eq!(collate("9", "a"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(collate("Essence", "Essence Mascara"), Ordering::Less);
    }

    #[test]
    fn test_punctuation_and_letters() {
        assert_eq!(collate("home decoration", "homedecoration"), Ordering::Less);
        assert_eq!(collate("mens-shirts", "mens-shoes"), Ordering::Less);
        assert_eq!(collate("a_b", "a-b"), Ordering::Less);
    }

    #[test]
    fn test_accents_are_secondary() {
        assert_eq!(collate("éclair", "zebra"), Ordering::Less);
        assert_eq!(collate("Émile", "Fiona"), Ordering::Less);
        assert_eq!(collate("eclair", "éclair"), Ordering::Less);
    }

    #[test]
    fn test_reused_collator() {
        let mut collation = Collation::new();
        assert_eq!(collation.compare("b", "a"), Ordering::Greater);
        assert_eq!(collation.compare("a", "b"), Ordering::Less);
    }
}
