//! Review scoring agent.
//!
//! Turns review text into paired 1–5 sub-score arrays. The adjective
//! table that drives the scores is part of the agent's prompt; nothing in
//! Rust inspects review wording.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::agents::{Agent, AgentError, AgentKind};
use crate::prompts::REVIEW_SCORER_PROMPT;
use crate::session::LlmSession;

lazy_static! {
    /// Grabs the JSON object from a reply that may be fenced or chatty.
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Parallel sub-score arrays, one element per review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubScores {
    pub food_scores: Vec<u32>,
    pub customer_service_scores: Vec<u32>,
}

/// Derives per-review food and customer-service sub-scores.
pub struct ReviewScorerAgent {
    session: Arc<LlmSession>,
}

impl ReviewScorerAgent {
    pub fn new(session: Arc<LlmSession>) -> Self {
        Self { session }
    }

    /// Score every review for a restaurant.
    ///
    /// Array lengths are reported as-is; pairwise equality is enforced
    /// downstream by the score calculator, which is the contract owner.
    pub async fn score(
        &self,
        restaurant: &str,
        reviews: &[String],
    ) -> Result<SubScores, AgentError> {
        let mut message = format!(
            "Here are the {} reviews for {}. Give me the arrays of food and \
             customer service scores from the reviews.\n",
            reviews.len(),
            restaurant
        );
        for (idx, review) in reviews.iter().enumerate() {
            message.push_str(&format!("{}. {}\n", idx + 1, review));
        }

        let reply = self
            .session
            .complete(self.kind(), self.system_prompt(), &message)
            .await?;

        let scores = parse_sub_scores(&reply).ok_or_else(|| AgentError::MalformedReply {
            agent: self.kind().name(),
            detail: format!("expected a JSON object with the two score arrays, got: {reply}"),
        })?;

        if scores.food_scores.len() != reviews.len() {
            tracing::warn!(
                reviews = reviews.len(),
                scored = scores.food_scores.len(),
                "sub-score count does not match review count"
            );
        }

        Ok(scores)
    }
}

impl Agent for ReviewScorerAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::ReviewScorer
    }

    fn system_prompt(&self) -> &'static str {
        REVIEW_SCORER_PROMPT
    }
}

/// Parse the scorer's JSON reply, tolerating fences and surrounding prose.
fn parse_sub_scores(reply: &str) -> Option<SubScores> {
    let json = JSON_OBJECT.find(reply)?.as_str();
    serde_json::from_str(json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_json() {
        let scores = parse_sub_scores(
            r#"{"food_scores": [3, 4], "customer_service_scores": [3, 5]}"#,
        )
        .unwrap();
        assert_eq!(scores.food_scores, [3, 4]);
        assert_eq!(scores.customer_service_scores, [3, 5]);
    }

    #[test]
    fn test_parses_fenced_json() {
        let reply = "Here you go:\n```json\n{\"food_scores\": [1], \"customer_service_scores\": [2]}\n```";
        let scores = parse_sub_scores(reply).unwrap();
        assert_eq!(scores.food_scores, [1]);
        assert_eq!(scores.customer_service_scores, [2]);
    }

    #[test]
    fn test_rejects_non_json_reply() {
        assert!(parse_sub_scores("The food sounded average to me.").is_none());
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(parse_sub_scores(r#"{"scores": [1, 2, 3]}"#).is_none());
    }
}
