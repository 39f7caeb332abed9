//! Overall-score calculation.
//!
//! Combines paired per-review food and customer-service sub-scores into a
//! single 0–10 metric:
//!
//! ```text
//! raw = sum(sqrt(food[i]^2 * service[i])) * 10 / (N * sqrt(125))
//! ```
//!
//! This is a geometric-mean-like aggregator: squaring the food score
//! before combination weights food quality more heavily than service
//! quality. A perfect per-review pair contributes `sqrt(5^2 * 5) =
//! sqrt(125)`, so the normalizing constant scales the maximum total to
//! exactly 10.
//!
//! The result is rounded to 3 decimal places, half away from zero.
//! Sub-scores are nominally in `[1, 5]` but are NOT clamped or validated;
//! out-of-range values pass through the formula unchanged.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Errors from the score calculator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error(
        "food_scores has {food} entries but customer_service_scores has {customer_service}; \
         lengths must match"
    )]
    LengthMismatch { food: usize, customer_service: usize },
}

/// A computed overall score for exactly one restaurant.
///
/// Serializes as the single-entry mapping `{"<restaurant>": <score>}`
/// that the orchestration layer exposes to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallScore {
    /// The restaurant identifier, passed through unchanged.
    pub restaurant: String,

    /// The aggregated 0–10 score, rounded to 3 decimal places.
    pub score: f64,
}

impl OverallScore {
    /// The score formatted with exactly 3 decimal places.
    pub fn display_score(&self) -> String {
        format!("{:.3}", self.score)
    }

    /// The single-entry name-to-score mapping form.
    pub fn to_map(&self) -> HashMap<String, f64> {
        HashMap::from([(self.restaurant.clone(), self.score)])
    }
}

impl Serialize for OverallScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.restaurant, &self.score)?;
        map.end()
    }
}

/// Compute the overall score for a restaurant from paired sub-scores.
///
/// The restaurant identifier is opaque and passed through to the result
/// unchanged (casing included). The two sequences must have equal length;
/// a mismatch fails with [`ScoreError::LengthMismatch`] before any
/// computation. Empty inputs are not an error: the score is exactly
/// 0.000.
pub fn calculate_overall_score(
    restaurant: impl Into<String>,
    food_scores: &[u32],
    customer_service_scores: &[u32],
) -> Result<OverallScore, ScoreError> {
    if food_scores.len() != customer_service_scores.len() {
        return Err(ScoreError::LengthMismatch {
            food: food_scores.len(),
            customer_service: customer_service_scores.len(),
        });
    }

    let restaurant = restaurant.into();
    let n = food_scores.len();
    if n == 0 {
        return Ok(OverallScore {
            restaurant,
            score: 0.0,
        });
    }

    let sum: f64 = food_scores
        .iter()
        .zip(customer_service_scores)
        .map(|(&food, &service)| ((food as f64).powi(2) * service as f64).sqrt())
        .sum();

    let raw = sum * 10.0 / (n as f64 * 125f64.sqrt());

    Ok(OverallScore {
        restaurant,
        score: round_to_3dp(raw),
    })
}

/// Round to 3 decimal places, half away from zero.
fn round_to_3dp(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_score(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let result = calculate_overall_score("x", &[], &[]).unwrap();
        assert_eq!(result.restaurant, "x");
        assert_score(result.score, 0.0);
        assert_eq!(result.display_score(), "0.000");
    }

    #[test]
    fn test_ascending_ladder_case() {
        // Derived from the formula: sum of sqrt(i^2 * i) for i in 1..=5
        // is 28.2049..., scaled by 10 / (5 * sqrt(125)).
        let result =
            calculate_overall_score("applebee s", &[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5]).unwrap();
        assert_score(result.score, 5.045);
        assert_eq!(result.to_map(), HashMap::from([("applebee s".into(), 5.045)]));
    }

    #[test]
    fn test_maximum_case_is_ten() {
        // Every term equals sqrt(125), so the normalizer scales the sum
        // to exactly 10.
        let result = calculate_overall_score("x", &[5, 5, 5], &[5, 5, 5]).unwrap();
        assert_score(result.score, 10.0);
        assert_eq!(result.display_score(), "10.000");
    }

    #[test]
    fn test_minimum_nominal_case() {
        // All-ones: each term is sqrt(1) = 1, so raw = 10 / sqrt(125).
        let result = calculate_overall_score("x", &[1, 1], &[1, 1]).unwrap();
        assert_score(result.score, 0.894);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = calculate_overall_score("x", &[1, 2], &[1]).unwrap_err();
        assert_eq!(
            err,
            ScoreError::LengthMismatch {
                food: 2,
                customer_service: 1
            }
        );
    }

    #[test]
    fn test_out_of_range_scores_pass_through_unclamped() {
        // sqrt(6^2 * 6) = sqrt(216) > sqrt(125); the result exceeds 10
        // rather than being clamped.
        let result = calculate_overall_score("x", &[6], &[6]).unwrap();
        assert!(result.score > 10.0);
    }

    #[test]
    fn test_restaurant_identifier_passes_through_unchanged() {
        let result = calculate_overall_score("Applebee's", &[4], &[4]).unwrap();
        assert_eq!(result.restaurant, "Applebee's");
    }

    #[test]
    fn test_serializes_as_single_entry_map() {
        let result = calculate_overall_score("x", &[5, 5, 5], &[5, 5, 5]).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 10.0 }));
    }
}
