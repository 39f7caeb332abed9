//! Completion caching.
//!
//! All agent calls run at temperature 0, so a repeated prompt against the
//! same model is expected to produce the same completion; caching them
//! avoids paying twice for identical queries within a process lifetime.

use moka::future::Cache;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::config::CacheConfig;
use crate::providers::ChatMessage;

/// Cache key for a completion: model plus the full message sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model_hash: u64,
    messages_hash: u64,
}

impl CacheKey {
    /// Build a key from the model name and the messages sent.
    pub fn new(model: &str, messages: &[ChatMessage]) -> Self {
        Self {
            model_hash: hash_str(model),
            messages_hash: hash_messages(messages),
        }
    }
}

/// In-memory completion cache using moka.
pub struct CompletionCache {
    cache: Cache<CacheKey, String>,
}

impl CompletionCache {
    /// Create a new cache with the given sizing.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Create a cache from runtime configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    /// Get a cached completion.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        self.cache.get(key).await
    }

    /// Store a completion.
    pub async fn insert(&self, key: CacheKey, content: String) {
        self.cache.insert(key, content).await;
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Number of cached completions.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for CompletionCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

// Hash helpers

fn hash_str(text: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

fn hash_messages(messages: &[ChatMessage]) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    for message in messages {
        message.role.hash(&mut hasher);
        message.content.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(content: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are an extractor agent."),
            ChatMessage::user(content),
        ]
    }

    #[tokio::test]
    async fn test_cache_hit_after_insert() {
        let cache = CompletionCache::default();
        let key = CacheKey::new("gpt-4o-mini", &messages("How good is Subway?"));

        assert!(cache.get(&key).await.is_none());

        cache
            .insert(key.clone(), "Restaurant name: Subway.".to_string())
            .await;

        assert_eq!(
            cache.get(&key).await.as_deref(),
            Some("Restaurant name: Subway.")
        );
    }

    #[tokio::test]
    async fn test_different_model_is_a_different_key() {
        let msgs = messages("How good is Subway?");
        let a = CacheKey::new("gpt-4o-mini", &msgs);
        let b = CacheKey::new("gemini-1.5-flash", &msgs);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_different_query_is_a_different_key() {
        let a = CacheKey::new("gpt-4o-mini", &messages("How good is Subway?"));
        let b = CacheKey::new("gpt-4o-mini", &messages("How good is IHOP?"));
        assert_ne!(a, b);
    }
}
