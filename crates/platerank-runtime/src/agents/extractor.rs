//! Restaurant-name extraction agent.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::agents::{Agent, AgentError, AgentKind};
use crate::prompts::NAME_EXTRACTOR_PROMPT;
use crate::session::LlmSession;

lazy_static! {
    /// Matches the agreed reply format `Restaurant name: <name>.`
    static ref NAME_REPLY: Regex = Regex::new(r"(?im)^\s*restaurant name:\s*(.+?)\s*$").unwrap();
}

/// Extracts the raw restaurant name from a free-text query.
///
/// The reply format is fixed by [`NAME_EXTRACTOR_PROMPT`]; anything that
/// does not match it is a malformed reply, not a guess to salvage.
pub struct NameExtractorAgent {
    session: Arc<LlmSession>,
}

impl NameExtractorAgent {
    pub fn new(session: Arc<LlmSession>) -> Self {
        Self { session }
    }

    /// Extract the restaurant name as it appears in the query.
    ///
    /// The returned name is raw; normalization into a restaurant key is
    /// the caller's job, so the same normalization is used for lookups
    /// and for display decisions.
    pub async fn extract(&self, query: &str) -> Result<String, AgentError> {
        let message = format!(
            "The user has asked '{query}'. Give me the name of the restaurant. \
             The name will be used later in the chat."
        );

        let reply = self
            .session
            .complete(self.kind(), self.system_prompt(), &message)
            .await?;

        parse_name_reply(&reply).ok_or_else(|| AgentError::MalformedReply {
            agent: self.kind().name(),
            detail: format!("expected 'Restaurant name: <name>.', got: {reply}"),
        })
    }
}

impl Agent for NameExtractorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::NameExtractor
    }

    fn system_prompt(&self) -> &'static str {
        NAME_EXTRACTOR_PROMPT
    }
}

/// Pull the name out of a `Restaurant name: <name>.` reply.
fn parse_name_reply(reply: &str) -> Option<String> {
    let captured = NAME_REPLY.captures(reply)?.get(1)?.as_str();
    // The prompt's closing period is format punctuation, not part of the
    // name; strip exactly one.
    let name = captured.strip_suffix('.').unwrap_or(captured).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_agreed_format() {
        assert_eq!(
            parse_name_reply("Restaurant name: Applebee's.").as_deref(),
            Some("Applebee's")
        );
    }

    #[test]
    fn test_case_insensitive_and_embedded_line() {
        let reply = "Sure.\nrestaurant name: Taco Bell.\n";
        assert_eq!(parse_name_reply(reply).as_deref(), Some("Taco Bell"));
    }

    #[test]
    fn test_strips_only_one_trailing_period() {
        // A name can legitimately end in a period-adjacent token.
        assert_eq!(
            parse_name_reply("Restaurant name: In-N-Out Burger Inc..").as_deref(),
            Some("In-N-Out Burger Inc.")
        );
    }

    #[test]
    fn test_rejects_missing_format() {
        assert!(parse_name_reply("I can't do it: no restaurant was mentioned.").is_none());
        assert!(parse_name_reply("Restaurant name: .").is_none());
    }
}
