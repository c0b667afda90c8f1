//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::ToSql;

/// `SIMILAR TO` pattern matching a text containing any of the words of a
/// search input.
#[derive(Clone, Debug, Display, Eq, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Characters having a special meaning in a `SIMILAR TO` pattern.
    const SPECIAL: &'static [char] = &[
        '\\', '%', '_', '|', '*', '+', '?', '{', '}', '(', ')', '[', ']',
    ];

    /// Creates a new [`FuzzPattern`] out of the given search `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let words = input.split_whitespace().format_with("|", |word, f| {
            let escaped = word.chars().format_with("", |c, f| {
                if Self::SPECIAL.contains(&c) {
                    f(&format_args!("\\{c}"))
                } else {
                    f(&c)
                }
            });
            f(&format_args!("%{escaped}%"))
        });
        Self(format!("({words})"))
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn joins_words() {
        assert_eq!(
            FuzzPattern::new("senior  dev").to_string(),
            "(%senior%|%dev%)",
        );
        assert_eq!(FuzzPattern::new("qa").to_string(), "(%qa%)");
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            FuzzPattern::new("c++ 100%").to_string(),
            r"(%c\+\+%|%100\%%)",
        );
        assert_eq!(FuzzPattern::new("a_b").to_string(), r"(%a\_b%)");
    }
}
