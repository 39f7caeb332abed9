//! System prompts for the query agents.
//!
//! The prompts encode two contracts the surrounding Rust code relies on:
//!
//! 1. The name extractor replies in the exact form
//!    `Restaurant name: <RestaurantName>.` so the reply can be parsed
//!    mechanically.
//! 2. The review scorer maps review adjectives to 1–5 sub-scores using the
//!    keyword table below and replies with a JSON object containing the
//!    two parallel arrays. The keyword table is a semantic contract for
//!    the language model; it is never implemented as keyword matching in
//!    Rust.

/// Marker appended to the closing message when the conversation is
/// complete; stripped before the answer reaches the user.
pub const TERMINATION_MARKER: &str = "[END CHAT]";

/// Name extractor prompt: free-text query in, raw restaurant name out.
pub const NAME_EXTRACTOR_PROMPT: &str = r#"
You are an extractor agent that extracts the restaurant name from the input.
Reply with exactly one line in the format: 'Restaurant name: <RestaurantName>.'
Preserve the name as it appears in the query. If you cannot find a
restaurant name, say that you can't do it and explain why.
"#;

/// Review scorer prompt: reviews in, paired sub-score arrays out.
///
/// The adjective table is the score contract the model must honor.
pub const REVIEW_SCORER_PROMPT: &str = r#"
You are a scoring agent. You should look at every single review for a
restaurant and extract two scores:
- `food_score`: the quality of food at the restaurant. This will be a score between 1 and 5.
- `customer_service_score`: the quality of customer service at the restaurant. This will be a score between 1 and 5.

You should extract these two scores by looking for keywords in the review.
Each review has keyword adjectives that correspond to the score that the
restaurant should get for its `food_score` and `customer_service_score`.
Here are the keywords you should look out for:

- Score 1/5 if the review has one of these adjectives: awful, horrible, or disgusting.
- Score 2/5 if the review has one of these adjectives: bad, unpleasant, or offensive.
- Score 3/5 if the review has one of these adjectives: average, uninspiring, or forgettable.
- Score 4/5 if the review has one of these adjectives: good, enjoyable, or satisfying.
- Score 5/5 if the review has one of these adjectives: awesome, incredible, or amazing.

Reply with a single JSON object and nothing else:
{"food_scores": [..], "customer_service_scores": [..]}

The length of each array must equal the number of reviews, and each element
must correspond to the review at the same position.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorer_prompt_carries_full_keyword_table() {
        for adjective in [
            "awful",
            "horrible",
            "disgusting",
            "bad",
            "unpleasant",
            "offensive",
            "average",
            "uninspiring",
            "forgettable",
            "good",
            "enjoyable",
            "satisfying",
            "awesome",
            "incredible",
            "amazing",
        ] {
            assert!(
                REVIEW_SCORER_PROMPT.contains(adjective),
                "missing adjective: {adjective}"
            );
        }
    }

    #[test]
    fn test_extractor_prompt_fixes_reply_format() {
        assert!(NAME_EXTRACTOR_PROMPT.contains("Restaurant name: <RestaurantName>."));
    }

    #[test]
    fn test_termination_marker_is_stable() {
        // The closing-message formatter and the strip helpers both key
        // off this exact text.
        assert_eq!(TERMINATION_MARKER, "[END CHAT]");
    }
}
