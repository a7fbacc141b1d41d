//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::plain_text::PlainTextLayout;

/// Words of context given to the AI service on each side of a change
pub const DEFAULT_AI_CONTEXT_WORDS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound on one AI service call; `None` waits indefinitely
    pub ai_timeout_ms: Option<u64>,
    pub ai_context_words: usize,
    pub plain_text: PlainTextLayout,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ai_timeout_ms: None,
            ai_context_words: DEFAULT_AI_CONTEXT_WORDS,
            plain_text: PlainTextLayout::default(),
        }
    }
}

impl EngineSettings {
    pub fn ai_timeout(&self) -> Option<Duration> {
        self.ai_timeout_ms.map(Duration::from_millis)
    }
}
