//! Insights rendered once from a store, looked up by key or by query

use crate::matcher::{IntentMatch, IntentMatcher};
use crate::renderers::{InsightSpec, INSIGHTS};
use salesdesk_data::Store;
use serde::Serialize;

/// A rendered, immutable answer to one canned question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub key: &'static str,
    pub title: &'static str,
    pub triggers: &'static [&'static str],
    pub answer: String,
    pub facts: Vec<String>,
}

/// All insights for one dataset, rendered once at build time.
///
/// A changed dataset means a new catalog; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    insights: Vec<Insight>,
    dataset_fingerprint: String,
}

impl Catalog {
    pub fn build(store: &Store) -> Self {
        Self::build_from(store, INSIGHTS)
    }

    pub fn build_from(store: &Store, specs: &[InsightSpec]) -> Self {
        let insights: Vec<Insight> = specs
            .iter()
            .map(|spec| {
                let rendered = (spec.render)(store);
                Insight {
                    key: spec.key,
                    title: spec.title,
                    triggers: spec.triggers,
                    answer: rendered.answer,
                    facts: rendered.facts,
                }
            })
            .collect();

        tracing::info!(
            insights = insights.len(),
            facts = insights.iter().map(|i| i.facts.len()).sum::<usize>(),
            "built insight catalog"
        );

        Self {
            insights,
            dataset_fingerprint: store.fingerprint().to_string(),
        }
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn get(&self, key: &str) -> Option<&Insight> {
        self.insights.iter().find(|i| i.key == key)
    }

    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }

    pub fn dataset_fingerprint(&self) -> &str {
        &self.dataset_fingerprint
    }

    /// Match with the default overlap threshold
    pub fn match_query(&self, query: &str) -> Option<IntentMatch<'_>> {
        IntentMatcher::new(self).find(query)
    }

    /// Compact digest of every insight for use as model context
    pub fn overview(&self, max_facts: usize) -> String {
        let mut out = String::new();
        for insight in &self.insights {
            out.push_str(&format!("## {}\n", insight.title));
            if insight.facts.is_empty() {
                out.push_str(&insight.answer);
                out.push('\n');
            }
            for fact in insight.facts.iter().take(max_facts) {
                out.push_str(&format!("- {fact}\n"));
            }
        }
        out
    }
}
