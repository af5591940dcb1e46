//! The resolution strategies tried in order by the router

use salesdesk_index::{Embedder, IndexError, SearchHit, VectorIndex};
use salesdesk_insights::{Catalog, IntentMatcher};
use salesdesk_llm::{LanguageModel, LlmError, LlmFallback};
use salesdesk_telemetry::StrategyTag;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("semantic search failed: {0}")]
    Semantic(#[from] IndexError),

    #[error("language model failed: {0}")]
    Llm(#[from] LlmError),
}

/// Scratch state for one `ask`
#[derive(Debug, Default)]
pub struct Resolution {
    /// Everything the semantic strategy retrieved, accepted or not
    pub retrieved: Vec<SearchHit>,
}

/// One way of answering a query
pub trait Strategy: Send + Sync {
    fn tag(&self) -> StrategyTag;

    /// `Ok(None)` passes the query to the next strategy
    fn attempt(&self, query: &str, resolution: &mut Resolution)
        -> Result<Option<String>, RouteError>;
}

pub struct InsightStrategy {
    catalog: Arc<Catalog>,
    min_overlap: f64,
}

impl InsightStrategy {
    pub fn new(catalog: Arc<Catalog>, min_overlap: f64) -> Self {
        Self {
            catalog,
            min_overlap,
        }
    }
}

impl Strategy for InsightStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::Insight
    }

    fn attempt(&self, query: &str, _: &mut Resolution) -> Result<Option<String>, RouteError> {
        let matcher = IntentMatcher::with_min_overlap(&self.catalog, self.min_overlap);
        Ok(matcher.find(query).map(|hit| hit.insight.answer.clone()))
    }
}

pub struct SemanticStrategy {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    accept_distance: f32,
}

impl SemanticStrategy {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
        accept_distance: f32,
    ) -> Self {
        Self {
            index,
            embedder,
            top_k,
            accept_distance,
        }
    }
}

impl Strategy for SemanticStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::Semantic
    }

    fn attempt(
        &self,
        query: &str,
        resolution: &mut Resolution,
    ) -> Result<Option<String>, RouteError> {
        let hits = self.index.search(query, self.embedder.as_ref(), self.top_k)?;
        resolution.retrieved = hits;

        let accepted: Vec<&SearchHit> = resolution
            .retrieved
            .iter()
            .filter(|h| h.distance <= self.accept_distance)
            .collect();
        let Some((best, related)) = accepted.split_first() else {
            tracing::debug!(
                nearest = resolution.retrieved.first().map(|h| h.distance),
                threshold = self.accept_distance,
                "no snippet close enough"
            );
            return Ok(None);
        };

        let mut text = best.snippet.text.clone();
        if !related.is_empty() {
            text.push_str("\n\nRelated:");
            for hit in related {
                text.push_str("\n- ");
                text.push_str(&hit.snippet.text);
            }
        }
        Ok(Some(text))
    }
}

pub struct LlmStrategy {
    fallback: LlmFallback<Box<dyn LanguageModel>>,
    catalog: Arc<Catalog>,
    max_retries: u32,
    overview_facts: usize,
}

impl LlmStrategy {
    pub fn new(
        model: Box<dyn LanguageModel>,
        catalog: Arc<Catalog>,
        max_retries: u32,
        overview_facts: usize,
    ) -> Self {
        Self {
            fallback: LlmFallback::new(model),
            catalog,
            max_retries: max_retries.min(1),
            overview_facts,
        }
    }

    fn context(&self, resolution: &Resolution) -> Vec<String> {
        if resolution.retrieved.is_empty() {
            vec![format!(
                "Dataset Insights:\n{}",
                self.catalog.overview(self.overview_facts)
            )]
        } else {
            resolution
                .retrieved
                .iter()
                .map(|h| h.snippet.text.clone())
                .collect()
        }
    }
}

impl Strategy for LlmStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::Llm
    }

    fn attempt(
        &self,
        query: &str,
        resolution: &mut Resolution,
    ) -> Result<Option<String>, RouteError> {
        let context = self.context(resolution);
        let mut attempt = 0;
        loop {
            match self.fallback.answer(query, &context) {
                Ok(text) => return Ok(Some(text)),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "language model call failed, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
