//! # platerank-core
//!
//! Deterministic core for PlateRank: a flat-file review store and an
//! overall-score calculator.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: Language-model work lives in `platerank-runtime`
//! 3. **Fail-fast**: Missing files, unknown restaurants, and mismatched
//!    score sequences are surfaced immediately, never papered over
//! 4. **Share-freely**: A built [`ReviewStore`] is read-only and safe for
//!    concurrent readers without synchronization
//!
//! ## Example
//!
//! ```rust,no_run
//! use platerank_core::{calculate_overall_score, restaurant_key, ReviewStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ReviewStore::from_file("restaurant-data.txt")?;
//!
//! let key = restaurant_key("Applebee's");
//! let reviews = store.reviews(&key)?;
//! println!("{} reviews on file", reviews.len());
//!
//! // Sub-scores come from the runtime's review-scoring agent.
//! let result = calculate_overall_score(&key, &[4, 3], &[5, 3])?;
//! println!("{}: {}", result.restaurant, result.display_score());
//! # Ok(())
//! # }
//! ```

pub mod normalize;
pub mod score;
pub mod store;

// Re-export main types at crate root
pub use normalize::restaurant_key;
pub use score::{calculate_overall_score, OverallScore, ScoreError};
pub use store::{ReviewStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_store_keys_match_normalized_names() {
        // Round-trip: a key built by the store equals the key produced by
        // normalizing the name substring before the first '.'.
        let data = "Taco Bell.Quick and forgettable.\nChez Panisse.Incredible food.";
        let store = ReviewStore::from_reader(Cursor::new(data)).unwrap();

        for raw in ["Taco Bell", "Chez Panisse"] {
            assert!(store.contains(&restaurant_key(raw)));
        }
    }

    #[test]
    fn test_lookup_then_score() {
        let data = "Applebee's.The food was average.\nApplebee's.Service was good.";
        let store = ReviewStore::from_reader(Cursor::new(data)).unwrap();

        let key = restaurant_key("Applebee's");
        let reviews = store.reviews(&key).unwrap();
        assert_eq!(reviews.len(), 2);

        let result = calculate_overall_score(&key, &[3, 3], &[3, 4]).unwrap();
        assert_eq!(result.restaurant, "applebee s");
        assert!(result.score > 0.0 && result.score < 10.0);
    }
}
