//! Callable tools exposed to the query orchestrator.
//!
//! These are the two deterministic interfaces the LLM layer is allowed to
//! invoke: review lookup and overall-score calculation. Both wrap
//! `platerank-core` directly; nothing here touches a language model.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use platerank_core::{calculate_overall_score, ReviewStore, ScoreError, StoreError};

/// Tool name for the review-lookup interface.
pub const FETCH_RESTAURANT_DATA: &str = "fetch_restaurant_data";

/// Tool name for the scoring interface.
pub const CALCULATE_OVERALL_SCORE: &str = "calculate_overall_score";

/// Errors from tool execution.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// A deterministic capability callable by the orchestrator.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &'static str;

    /// One-line description used at registration time.
    fn describe(&self) -> &'static str;

    /// Execute with JSON arguments, returning a JSON result.
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

/// Registry of available tools, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool of the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        tracing::debug!(tool = tool.name(), "registering tool");
        self.tools.insert(tool.name(), tool);
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(input).await
    }

    /// Names of the registered tools.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registry with both built-in tools wired to a review store.
    pub fn with_defaults(store: Arc<ReviewStore>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FetchReviewsTool::new(store)));
        registry.register(Arc::new(OverallScoreTool));
        registry
    }
}

/// Lookup tool: normalized restaurant name in, ordered reviews out.
pub struct FetchReviewsTool {
    store: Arc<ReviewStore>,
}

impl FetchReviewsTool {
    pub fn new(store: Arc<ReviewStore>) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct FetchArgs {
    restaurant_name: String,
}

#[async_trait]
impl Tool for FetchReviewsTool {
    fn name(&self) -> &'static str {
        FETCH_RESTAURANT_DATA
    }

    fn describe(&self) -> &'static str {
        "Fetches the reviews for a specific restaurant."
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: FetchArgs = serde_json::from_value(input)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        // The caller is responsible for pre-normalizing the name; the
        // store only matches exact keys.
        match self.store.reviews(&args.restaurant_name) {
            Ok(reviews) => Ok(json!({ args.restaurant_name: reviews })),
            Err(StoreError::RestaurantNotFound { name }) => {
                Err(ToolError::NotFound(format!("no reviews for restaurant '{name}'")))
            }
            Err(other) => Err(ToolError::InvalidArguments(other.to_string())),
        }
    }
}

/// Scoring tool: paired sub-score arrays in, single-entry score map out.
pub struct OverallScoreTool;

#[derive(Deserialize)]
struct ScoreArgs {
    restaurant_name: String,
    food_scores: Vec<u32>,
    customer_service_scores: Vec<u32>,
}

#[async_trait]
impl Tool for OverallScoreTool {
    fn name(&self) -> &'static str {
        CALCULATE_OVERALL_SCORE
    }

    fn describe(&self) -> &'static str {
        "Calculates an overall score for a restaurant."
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: ScoreArgs = serde_json::from_value(input)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let result = calculate_overall_score(
            args.restaurant_name,
            &args.food_scores,
            &args.customer_service_scores,
        )
        .map_err(|e: ScoreError| ToolError::InvalidArguments(e.to_string()))?;

        serde_json::to_value(&result).map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }
}
