//! Configuration for query resolution

use salesdesk_llm::ClientConfig;
use serde::{Deserialize, Serialize};

/// Router and pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// An insight matches when its trigger overlap is strictly above this
    pub min_overlap: f64,

    /// Semantic hits at or below this cosine distance are accepted
    pub accept_distance: f32,

    /// Snippets retrieved per query
    pub top_k: usize,

    /// Extra LLM attempts on timeout, 429 or 5xx. Values above 1 are clamped.
    pub llm_max_retries: u32,

    /// Add one snippet per order line to the corpus
    pub include_record_snippets: bool,

    /// Facts per insight in the model context when nothing was retrieved
    pub overview_facts: usize,

    pub llm: ClientConfig,
}

impl Config {
    pub fn new() -> Self {
        Self {
            min_overlap: 0.7,
            accept_distance: 0.35,
            top_k: 3,
            llm_max_retries: 1,
            include_record_snippets: true,
            overview_facts: 3,
            llm: ClientConfig::default(),
        }
    }

    pub fn effective_retries(&self) -> u32 {
        self.llm_max_retries.min(1)
    }

    pub fn effective_top_k(&self) -> usize {
        self.top_k.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
