//! Shared LLM call plumbing for one query run.
//!
//! [`LlmSession`] is the single path through which agents reach the
//! provider. It enforces token budgets, serves repeated prompts from the
//! completion cache, retries rate-limited calls with backoff, applies the
//! per-stage timeout, and records every turn in the transcript.
//!
//! Retries exist only here, for LLM traffic; the deterministic core is
//! strictly fail-fast.

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use thiserror::Error;

use crate::agents::AgentKind;
use crate::budget::{BudgetTracker, LlmUsage};
use crate::cache::{CacheKey, CompletionCache};
use crate::config::RuntimeConfig;
use crate::providers::{ChatMessage, LlmProvider, ProviderError};
use crate::transcript::{Transcript, TranscriptTurn};

/// Errors from session-level LLM calls.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("token budget exceeded for {agent}")]
    BudgetExceeded { agent: AgentKind },

    #[error("agent stage timed out after {0:?}")]
    StageTimeout(Duration),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Provider access shared by all agents in a run.
pub struct LlmSession {
    provider: Arc<dyn LlmProvider>,
    config: RuntimeConfig,
    budget: BudgetTracker,
    cache: CompletionCache,
    transcript: Transcript,
}

impl LlmSession {
    /// Create a session over a provider.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Self {
        let budget = BudgetTracker::new(config.global_max_tokens, config.per_agent_max_tokens);
        let cache = CompletionCache::from_config(&config.cache);

        Self {
            provider,
            config,
            budget,
            cache,
            transcript: Transcript::new(),
        }
    }

    /// Run one completion for an agent.
    ///
    /// The call is budget-checked first, then served from the cache if an
    /// identical prompt was already answered, otherwise sent to the
    /// provider with retry-on-rate-limit inside the stage timeout.
    pub async fn complete(
        &self,
        agent: AgentKind,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<String, SessionError> {
        let estimated =
            self.provider.estimate_tokens(system_prompt) + self.provider.estimate_tokens(user_content);
        if !self.budget.can_afford(agent, estimated + self.config.max_tokens) {
            tracing::warn!(agent = %agent, estimated, "token budget exceeded");
            return Err(SessionError::BudgetExceeded { agent });
        }

        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_content),
        ];
        self.transcript.record(agent.name(), "user", user_content);

        let key = CacheKey::new(&self.config.model, &messages);
        if let Some(content) = self.cache.get(&key).await {
            tracing::debug!(agent = %agent, "completion served from cache");
            self.budget.record_cache_hit();
            self.transcript.record(agent.name(), "assistant", &content);
            return Ok(content);
        }

        let completion_config = self.config.completion_config();
        let attempt = || {
            let messages = messages.clone();
            let completion_config = completion_config.clone();
            async move { self.provider.complete(messages, &completion_config).await }
        };

        let retried = attempt
            .retry(ExponentialBuilder::default().with_max_times(2))
            .when(|e| matches!(e, ProviderError::RateLimited { .. }))
            .notify(|err, dur| {
                tracing::warn!(agent = %agent, error = %err, backoff = ?dur, "rate limited, retrying");
            });

        let response = tokio::time::timeout(self.config.agent_timeout, retried)
            .await
            .map_err(|_| SessionError::StageTimeout(self.config.agent_timeout))??;

        tracing::debug!(
            agent = %agent,
            model = %response.model,
            tokens = response.usage.total(),
            "completion received"
        );

        self.budget.record_usage(agent, &response.usage, &self.config.model);
        self.transcript
            .record(agent.name(), "assistant", &response.content);
        self.cache.insert(key, response.content.clone()).await;

        Ok(response.content)
    }

    /// Accumulated usage for this run.
    pub fn usage(&self) -> LlmUsage {
        self.budget.get_usage()
    }

    /// Snapshot of the transcript so far.
    pub fn transcript_turns(&self) -> Vec<TranscriptTurn> {
        self.transcript.turns()
    }

    /// Render the transcript as readable text.
    pub fn render_transcript(&self) -> String {
        self.transcript.render()
    }

    /// The runtime configuration this session runs under.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}
