//! Conversation transcript.
//!
//! Records every turn that crosses the provider boundary so a run can be
//! replayed and inspected after the fact.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One recorded turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    /// Which agent the turn belongs to
    pub agent: String,

    /// "user" or "assistant"
    pub role: String,

    /// Message content
    pub content: String,

    /// When the turn was recorded
    pub at: DateTime<Utc>,
}

/// Append-only transcript of a query run.
#[derive(Default)]
pub struct Transcript {
    turns: Mutex<Vec<TranscriptTurn>>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a turn.
    pub fn record(&self, agent: &str, role: &str, content: &str) {
        self.turns.lock().push(TranscriptTurn {
            agent: agent.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            at: Utc::now(),
        });
    }

    /// Snapshot of all turns so far.
    pub fn turns(&self) -> Vec<TranscriptTurn> {
        self.turns.lock().clone()
    }

    /// Number of recorded turns.
    pub fn len(&self) -> usize {
        self.turns.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.lock().is_empty()
    }

    /// Render the transcript as readable text, one turn per line.
    pub fn render(&self) -> String {
        self.turns
            .lock()
            .iter()
            .map(|turn| format!("[{}/{}] {}", turn.agent, turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let transcript = Transcript::new();
        transcript.record("name_extractor_agent", "user", "find the name");
        transcript.record("name_extractor_agent", "assistant", "Restaurant name: Subway.");

        let turns = transcript.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[1].content, "Restaurant name: Subway.");
    }

    #[test]
    fn test_render_is_one_line_per_turn() {
        let transcript = Transcript::new();
        transcript.record("a", "user", "one");
        transcript.record("b", "assistant", "two");

        let rendered = transcript.render();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("[b/assistant] two"));
    }

    #[test]
    fn test_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }
}
