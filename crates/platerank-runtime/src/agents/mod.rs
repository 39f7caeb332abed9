//! LLM-backed pipeline agents.

mod extractor;
mod scorer;
mod traits;

pub use extractor::NameExtractorAgent;
pub use scorer::{ReviewScorerAgent, SubScores};
pub use traits::{Agent, AgentError, AgentKind};
