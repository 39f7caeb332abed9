//! # platerank-runtime
//!
//! LLM orchestration layer for the restaurant review scorer. The
//! deterministic engine lives in `platerank-core`; this crate wraps it in
//! a small agent pipeline that turns a free-text query into an overall
//! score.
//!
//! ## Architecture
//!
//! - [`providers`]: the [`providers::LlmProvider`] trait, provider
//!   factories, and credential handling. The OpenAI-compatible HTTP
//!   provider is behind the `openai` feature.
//! - [`agents`]: the name extractor and review scorer, the only two
//!   stages that talk to a language model.
//! - [`tools`]: the deterministic capabilities the pipeline may call,
//!   review lookup and overall-score calculation.
//! - [`session`]: shared call plumbing with token budgets, a completion
//!   cache, retry on rate limits, and a full transcript.
//! - [`orchestrator`]: the staged pipeline behind [`QueryAnswerer`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use platerank_core::ReviewStore;
//! use platerank_runtime::{QueryAnswerer, QueryOrchestrator, RuntimeConfig};
//!
//! # async fn run(provider: Arc<dyn platerank_runtime::LlmProvider>) -> anyhow::Result<()> {
//! let store = Arc::new(ReviewStore::from_file("restaurant-data.txt")?);
//! let orchestrator = QueryOrchestrator::builder()
//!     .provider(provider)
//!     .store(store)
//!     .config(RuntimeConfig::default())
//!     .build()?;
//!
//! let report = orchestrator.answer("How good is Subway as a restaurant?").await?;
//! println!("{}", report.answer);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod budget;
pub mod cache;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod tools;
pub mod transcript;

pub use agents::{Agent, AgentError, AgentKind, NameExtractorAgent, ReviewScorerAgent, SubScores};
pub use budget::{BudgetTracker, LlmUsage, TokenBudget};
pub use config::{CacheConfig, ConfigError, RuntimeConfig};
pub use orchestrator::{
    is_termination, strip_termination, QueryAnswerer, QueryOrchestrator, RunReport, RuntimeError,
};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry, TokenUsage,
};
pub use session::{LlmSession, SessionError};
pub use tools::{Tool, ToolError, ToolRegistry};
pub use transcript::{Transcript, TranscriptTurn};
