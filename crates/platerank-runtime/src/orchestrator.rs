//! Staged query pipeline.
//!
//! [`QueryOrchestrator`] answers one free-text restaurant query by running
//! a fixed sequence of stages: extract the restaurant name, fetch its
//! reviews, derive sub-scores, calculate the overall score, and format the
//! answer. Only the two extraction stages involve a language model; the
//! data and math stages are deterministic tools.
//!
//! # Key Guarantees
//! 1. Every LLM round is counted and capped by `max_rounds`.
//! 2. Stage outputs flow forward explicitly; no agent sees another
//!    agent's conversation.
//! 3. A missing restaurant surfaces as [`RuntimeError::RestaurantNotFound`],
//!    never as a fabricated score.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use platerank_core::{restaurant_key, ReviewStore};

use crate::agents::{AgentError, NameExtractorAgent, ReviewScorerAgent};
use crate::budget::LlmUsage;
use crate::config::RuntimeConfig;
use crate::prompts::TERMINATION_MARKER;
use crate::providers::LlmProvider;
use crate::session::LlmSession;
use crate::tools::{ToolError, ToolRegistry, CALCULATE_OVERALL_SCORE, FETCH_RESTAURANT_DATA};
use crate::transcript::TranscriptTurn;

/// Errors from a query run.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("no data found for restaurant '{name}'")]
    RestaurantNotFound { name: String },

    #[error("conversation exceeded {max} rounds")]
    RoundsExhausted { max: u32 },
}

/// Everything produced by one query run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Final user-facing answer, termination marker stripped
    pub answer: String,

    /// Normalized key the reviews were fetched under
    pub restaurant_key: String,

    /// Overall score, rounded to 3 decimals
    pub score: f64,

    /// Accumulated LLM usage
    pub usage: LlmUsage,

    /// Full conversation transcript
    pub transcript: Vec<TranscriptTurn>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// Anything that can answer a free-text restaurant query.
#[async_trait]
pub trait QueryAnswerer: Send + Sync {
    async fn answer(&self, query: &str) -> Result<RunReport, RuntimeError>;
}

/// The staged pipeline behind [`QueryAnswerer`].
pub struct QueryOrchestrator {
    session: Arc<LlmSession>,
    tools: ToolRegistry,
    extractor: NameExtractorAgent,
    scorer: ReviewScorerAgent,
    rounds: AtomicU32,
}

impl QueryOrchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> QueryOrchestratorBuilder {
        QueryOrchestratorBuilder::default()
    }

    /// Count one LLM round against the cap.
    fn take_round(&self) -> Result<(), RuntimeError> {
        let max = self.session.config().max_rounds;
        let used = self.rounds.fetch_add(1, Ordering::SeqCst);
        if used >= max {
            return Err(RuntimeError::RoundsExhausted { max });
        }
        Ok(())
    }
}

#[async_trait]
impl QueryAnswerer for QueryOrchestrator {
    async fn answer(&self, query: &str) -> Result<RunReport, RuntimeError> {
        let started_at = Utc::now();
        tracing::info!(query, "starting query run");

        self.take_round()?;
        let raw_name = self.extractor.extract(query).await?;
        let key = restaurant_key(&raw_name);
        tracing::debug!(raw_name, key, "restaurant name extracted");

        let fetched = self
            .tools
            .execute(FETCH_RESTAURANT_DATA, json!({ "restaurant_name": key }))
            .await
            .map_err(|err| match err {
                ToolError::NotFound(_) => RuntimeError::RestaurantNotFound {
                    name: raw_name.clone(),
                },
                other => RuntimeError::Tool(other),
            })?;
        let reviews: Vec<String> = fetched[&key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        tracing::debug!(key, count = reviews.len(), "reviews fetched");

        self.take_round()?;
        let sub_scores = self.scorer.score(&raw_name, &reviews).await?;

        let scored = self
            .tools
            .execute(
                CALCULATE_OVERALL_SCORE,
                json!({
                    "restaurant_name": key,
                    "food_scores": sub_scores.food_scores,
                    "customer_service_scores": sub_scores.customer_service_scores,
                }),
            )
            .await?;
        let score = scored[&key].as_f64().ok_or_else(|| {
            ToolError::InvalidArguments(format!("score result missing entry for '{key}'"))
        })?;

        let closing = format!(
            "The overall score for {raw_name} is {score:.3}. {TERMINATION_MARKER}"
        );
        let answer = strip_termination(&closing).to_string();
        tracing::info!(key, score, "query run complete");

        Ok(RunReport {
            answer,
            restaurant_key: key,
            score,
            usage: self.session.usage(),
            transcript: self.session.transcript_turns(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Whether a message ends the conversation.
pub fn is_termination(message: &str) -> bool {
    message.contains(TERMINATION_MARKER)
}

/// Remove the termination marker and surrounding whitespace.
pub fn strip_termination(message: &str) -> &str {
    match message.find(TERMINATION_MARKER) {
        Some(idx) => message[..idx].trim_end(),
        None => message.trim_end(),
    }
}

/// Builder for [`QueryOrchestrator`].
#[derive(Default)]
pub struct QueryOrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    store: Option<Arc<ReviewStore>>,
    config: Option<RuntimeConfig>,
}

impl QueryOrchestratorBuilder {
    /// The LLM provider to run agents against.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// The review store backing the fetch tool.
    pub fn store(mut self, store: Arc<ReviewStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Runtime configuration; defaults are used if omitted.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Assemble the orchestrator.
    pub fn build(self) -> Result<QueryOrchestrator, anyhow::Error> {
        let provider = self
            .provider
            .ok_or_else(|| anyhow::anyhow!("orchestrator requires a provider"))?;
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("orchestrator requires a review store"))?;
        let config = self.config.unwrap_or_default();

        let session = Arc::new(LlmSession::new(provider, config));
        Ok(QueryOrchestrator {
            tools: ToolRegistry::with_defaults(store),
            extractor: NameExtractorAgent::new(session.clone()),
            scorer: ReviewScorerAgent::new(session.clone()),
            session,
            rounds: AtomicU32::new(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        ChatMessage, CompletionConfig, CompletionResponse, ProviderError, TokenUsage,
    };
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;

    struct ScriptedProvider {
        replies: Vec<String>,
        next: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| r.to_string()).collect(),
                next: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            let idx = self.next.fetch_add(1, Ordering::SeqCst);
            let content = self
                .replies
                .get(idx)
                .cloned()
                .ok_or_else(|| ProviderError::ApiError {
                    status: 500,
                    message: "script exhausted".to_string(),
                })?;
            Ok(CompletionResponse {
                content,
                usage: TokenUsage {
                    prompt_tokens: 20,
                    completion_tokens: 10,
                },
                model: "scripted".to_string(),
                finish_reason: Some("stop".to_string()),
            })
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn store() -> Arc<ReviewStore> {
        Arc::new(
            ReviewStore::from_reader(Cursor::new(
                "Applebee's.The food was good.\nApplebee's.Service was enjoyable.",
            ))
            .unwrap(),
        )
    }

    fn orchestrator(replies: &[&str]) -> QueryOrchestrator {
        QueryOrchestrator::builder()
            .provider(Arc::new(ScriptedProvider::new(replies)))
            .store(store())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_pipeline_produces_rounded_score() {
        let orchestrator = orchestrator(&[
            "Restaurant name: Applebee's.",
            r#"{"food_scores": [4, 4], "customer_service_scores": [4, 4]}"#,
        ]);

        let report = orchestrator
            .answer("How good is Applebee's as a restaurant?")
            .await
            .unwrap();

        assert_eq!(report.restaurant_key, "applebee s");
        assert_eq!(report.score, 7.155);
        assert_eq!(
            report.answer,
            "The overall score for Applebee's is 7.155."
        );
        assert!(!report.answer.contains(TERMINATION_MARKER));
        assert_eq!(report.usage.llm_calls, 2);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_unknown_restaurant_is_reported_not_scored() {
        let orchestrator = orchestrator(&["Restaurant name: Chez Nowhere."]);

        let err = orchestrator
            .answer("How good is Chez Nowhere?")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::RestaurantNotFound { ref name } if name == "Chez Nowhere"
        ));
    }

    #[tokio::test]
    async fn test_mismatched_sub_scores_fail_before_math() {
        let orchestrator = orchestrator(&[
            "Restaurant name: Applebee's.",
            r#"{"food_scores": [4, 4], "customer_service_scores": [4]}"#,
        ]);

        let err = orchestrator
            .answer("How good is Applebee's?")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::Tool(ToolError::InvalidArguments(_))
        ));
    }

    #[tokio::test]
    async fn test_round_cap_is_enforced() {
        let orchestrator = QueryOrchestrator::builder()
            .provider(Arc::new(ScriptedProvider::new(&[
                "Restaurant name: Applebee's.",
            ])))
            .store(store())
            .config(RuntimeConfig {
                max_rounds: 1,
                ..Default::default()
            })
            .build()
            .unwrap();

        let err = orchestrator
            .answer("How good is Applebee's?")
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::RoundsExhausted { max: 1 }));
    }

    #[test]
    fn test_termination_helpers() {
        assert!(is_termination("All done. [END CHAT]"));
        assert!(!is_termination("Still thinking."));
        assert_eq!(strip_termination("All done. [END CHAT]"), "All done.");
        assert_eq!(strip_termination("No marker here"), "No marker here");
    }

    proptest::proptest! {
        #[test]
        fn prop_stripped_message_never_carries_marker(prefix in r"[^\[]*") {
            let message = format!("{prefix}{TERMINATION_MARKER}");
            proptest::prop_assert!(is_termination(&message));
            proptest::prop_assert!(!strip_termination(&message).contains(TERMINATION_MARKER));
        }
    }
}
