//! Restaurant key normalization.
//!
//! A restaurant key is the join key between the review store and score
//! lookups. It is derived from a raw restaurant name by lower-casing and
//! replacing every character outside `[0-9a-zA-Z]` with a single space,
//! one-for-one. Whitespace is NOT collapsed: two raw names are the same
//! restaurant exactly when their keys are equal.
//!
//! The same function is used when building the store and when producing
//! lookup keys, so key equality is bit-for-bit.

/// Normalize a raw restaurant name into a restaurant key.
///
/// # Examples
///
/// ```
/// use platerank_core::normalize::restaurant_key;
///
/// assert_eq!(restaurant_key("Applebee's"), "applebee s");
/// assert_eq!(restaurant_key("In-N-Out"), "in n out");
/// ```
pub fn restaurant_key(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lowercases_and_replaces_punctuation() {
        assert_eq!(restaurant_key("Applebee's"), "applebee s");
        assert_eq!(restaurant_key("Joe's Diner"), "joe s diner");
        assert_eq!(restaurant_key("McDonald's"), "mcdonald s");
    }

    #[test]
    fn test_digits_are_kept() {
        assert_eq!(restaurant_key("Pier 39 Cafe"), "pier 39 cafe");
    }

    #[test]
    fn test_whitespace_is_not_collapsed() {
        // Consecutive non-alphanumerics each become their own space.
        assert_eq!(restaurant_key("P.F. Chang's"), "p f  chang s");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(restaurant_key(""), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(raw in ".*") {
            let key = restaurant_key(&raw);
            prop_assert_eq!(restaurant_key(&key), key);
        }

        #[test]
        fn prop_output_alphabet_and_length(raw in ".*") {
            let key = restaurant_key(&raw);
            prop_assert_eq!(key.chars().count(), raw.chars().count());
            prop_assert!(key
                .chars()
                .all(|c| c == ' ' || c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
