//! Agent trait and common types.

use thiserror::Error;

use crate::session::SessionError;

/// The LLM-backed agents in the pipeline.
///
/// Data fetch and overall scoring are deterministic tools, not agents;
/// only the stages that need language understanding appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Extracts the restaurant name from the free-text query
    NameExtractor,

    /// Derives per-review sub-scores from review text
    ReviewScorer,
}

impl AgentKind {
    /// All agent kinds, for budget setup.
    pub const ALL: [AgentKind; 2] = [AgentKind::NameExtractor, AgentKind::ReviewScorer];

    /// Stable name used in transcripts and logs.
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::NameExtractor => "name_extractor_agent",
            AgentKind::ReviewScorer => "review_scorer_agent",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from agents.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{agent} produced a malformed reply: {detail}")]
    MalformedReply {
        agent: &'static str,
        detail: String,
    },
}

/// An LLM-backed pipeline agent.
///
/// # Isolation Contract
/// Agents operate in isolation: no shared mutable state, no access to
/// another agent's replies except what the orchestrator passes along
/// explicitly.
pub trait Agent: Send + Sync {
    /// The kind of this agent.
    fn kind(&self) -> AgentKind;

    /// The system prompt this agent runs under.
    fn system_prompt(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_names_are_stable() {
        assert_eq!(AgentKind::NameExtractor.name(), "name_extractor_agent");
        assert_eq!(AgentKind::ReviewScorer.name(), "review_scorer_agent");
    }

    #[test]
    fn test_all_covers_every_kind() {
        assert_eq!(AgentKind::ALL.len(), 2);
    }
}
