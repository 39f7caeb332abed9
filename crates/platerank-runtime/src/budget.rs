//! Token budget management for LLM calls.
//!
//! Enforces per-agent and global token budgets for one query run, and
//! accumulates usage for the run report. The deterministic core has no
//! budgets and no retries; everything here applies to LLM traffic only.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::agents::AgentKind;
use crate::providers::TokenUsage;

/// Token budget for a scope (agent or global).
pub struct TokenBudget {
    /// Maximum tokens allowed
    pub max_tokens: u32,

    /// Currently used tokens
    used: AtomicU32,
}

impl TokenBudget {
    /// Create a new token budget.
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            used: AtomicU32::new(0),
        }
    }

    /// Check if we can afford to use tokens.
    pub fn can_afford(&self, tokens: u32) -> bool {
        self.remaining() >= tokens
    }

    /// Record token usage.
    pub fn record(&self, tokens: u32) {
        self.used.fetch_add(tokens, Ordering::SeqCst);
    }

    /// Get remaining tokens.
    pub fn remaining(&self) -> u32 {
        self.max_tokens
            .saturating_sub(self.used.load(Ordering::SeqCst))
    }

    /// Reset the budget.
    pub fn reset(&self) {
        self.used.store(0, Ordering::SeqCst);
    }
}

/// Accumulated LLM usage for a query run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Total tokens used
    pub total_tokens: u32,

    /// Prompt/input tokens
    pub prompt_tokens: u32,

    /// Completion/output tokens
    pub completion_tokens: u32,

    /// Number of LLM calls made
    pub llm_calls: u32,

    /// Completions served from the cache
    pub cache_hits: u32,

    /// Estimated cost in USD
    pub estimated_cost: f64,
}

impl LlmUsage {
    /// Add token usage from a provider response.
    pub fn add(&mut self, usage: &TokenUsage, model: &str) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total();
        self.llm_calls += 1;
        self.estimated_cost += Self::estimate_cost(usage, model);
    }

    /// Estimate cost for a usage entry.
    fn estimate_cost(usage: &TokenUsage, model: &str) -> f64 {
        // Pricing per million tokens
        let (input_rate, output_rate) = match model {
            m if m.contains("gpt-4o-mini") => (0.15, 0.6),
            m if m.contains("gpt-4o") => (2.5, 10.0),
            m if m.contains("gemini-1.5-flash") => (0.075, 0.3),
            _ => (0.15, 0.6), // Default to gpt-4o-mini pricing
        };

        let input_cost = (usage.prompt_tokens as f64 / 1_000_000.0) * input_rate;
        let output_cost = (usage.completion_tokens as f64 / 1_000_000.0) * output_rate;

        input_cost + output_cost
    }
}

/// Budget tracker for one query run.
pub struct BudgetTracker {
    /// Per-agent budgets
    agent_budgets: HashMap<AgentKind, TokenBudget>,

    /// Global budget for the entire run
    global_budget: TokenBudget,

    /// Accumulated usage
    usage: RwLock<LlmUsage>,
}

impl BudgetTracker {
    /// Create a new budget tracker.
    pub fn new(global_max: u32, per_agent_max: u32) -> Self {
        let mut agent_budgets = HashMap::new();
        for kind in AgentKind::ALL {
            agent_budgets.insert(kind, TokenBudget::new(per_agent_max));
        }

        Self {
            agent_budgets,
            global_budget: TokenBudget::new(global_max),
            usage: RwLock::new(LlmUsage::default()),
        }
    }

    /// Check if we can afford a call for an agent.
    pub fn can_afford(&self, agent: AgentKind, estimated_tokens: u32) -> bool {
        let agent_ok = self
            .agent_budgets
            .get(&agent)
            .map(|b| b.can_afford(estimated_tokens))
            .unwrap_or(true);

        agent_ok && self.global_budget.can_afford(estimated_tokens)
    }

    /// Record usage after a call.
    pub fn record_usage(&self, agent: AgentKind, usage: &TokenUsage, model: &str) {
        let total = usage.total();

        if let Some(budget) = self.agent_budgets.get(&agent) {
            budget.record(total);
        }
        self.global_budget.record(total);

        self.usage.write().add(usage, model);
    }

    /// Record a completion served from the cache (no tokens spent).
    pub fn record_cache_hit(&self) {
        self.usage.write().cache_hits += 1;
    }

    /// Get current usage.
    pub fn get_usage(&self) -> LlmUsage {
        self.usage.read().clone()
    }

    /// Get remaining global budget.
    pub fn remaining_global(&self) -> u32 {
        self.global_budget.remaining()
    }

    /// Get remaining budget for an agent.
    pub fn remaining_agent(&self, agent: AgentKind) -> u32 {
        self.agent_budgets
            .get(&agent)
            .map(|b| b.remaining())
            .unwrap_or(0)
    }

    /// Reset all budgets.
    pub fn reset(&self) {
        for budget in self.agent_budgets.values() {
            budget.reset();
        }
        self.global_budget.reset();
        *self.usage.write() = LlmUsage::default();
    }
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self::new(20_000, 8_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_enforcement() {
        let budget = TokenBudget::new(100);

        assert!(budget.can_afford(50));
        assert!(budget.can_afford(100));
        assert!(!budget.can_afford(101));

        budget.record(60);
        assert_eq!(budget.remaining(), 40);
        assert!(!budget.can_afford(50));
        assert!(budget.can_afford(40));
    }

    #[test]
    fn test_budget_tracker() {
        let tracker = BudgetTracker::new(500, 100);

        assert!(tracker.can_afford(AgentKind::NameExtractor, 50));

        let usage = TokenUsage {
            prompt_tokens: 30,
            completion_tokens: 20,
        };
        tracker.record_usage(AgentKind::NameExtractor, &usage, "gpt-4o-mini");

        assert_eq!(tracker.remaining_agent(AgentKind::NameExtractor), 50);
        assert_eq!(tracker.remaining_global(), 450);
        assert!(!tracker.can_afford(AgentKind::NameExtractor, 60));
        // The other agent still has its own full budget, capped globally.
        assert!(tracker.can_afford(AgentKind::ReviewScorer, 100));
    }

    #[test]
    fn test_cache_hits_counted_without_tokens() {
        let tracker = BudgetTracker::default();
        tracker.record_cache_hit();

        let usage = tracker.get_usage();
        assert_eq!(usage.cache_hits, 1);
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn test_cost_estimation() {
        let mut usage = LlmUsage::default();
        let token_usage = TokenUsage {
            prompt_tokens: 1_000_000,
            completion_tokens: 1_000_000,
        };

        usage.add(&token_usage, "gpt-4o-mini");

        // $0.15/MTok in + $0.60/MTok out
        assert!((usage.estimated_cost - 0.75).abs() < 1e-9);
    }
}
