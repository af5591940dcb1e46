//! Query log record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which resolution path produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    /// Matched a precomputed insight by trigger phrase
    Insight,
    /// Answered from the nearest corpus snippets
    Semantic,
    /// Answered by the hosted model
    Llm,
    /// The hosted model was unavailable; the response describes the failure
    LlmFailed,
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyTag::Insight => "insight",
            StrategyTag::Semantic => "semantic",
            StrategyTag::Llm => "llm",
            StrategyTag::LlmFailed => "llm_failed",
        }
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved query. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub strategy: StrategyTag,
    pub response: String,
}

impl QueryLogEntry {
    pub fn new(query: impl Into<String>, strategy: StrategyTag, response: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            query: query.into(),
            strategy,
            response: response.into(),
        }
    }
}
