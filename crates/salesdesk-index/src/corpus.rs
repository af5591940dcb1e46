//! Retrievable text snippets derived from the catalog and the records

use salesdesk_data::Store;
use salesdesk_insights::{format_money, Catalog};
use serde::Serialize;

/// Where a snippet came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnippetSource {
    Insight { key: String },
    Fact { key: String, index: usize },
    Record { order_number: u64, line: Option<u32> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub text: String,
    pub source: SnippetSource,
}

#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Add one sentence per order line
    pub include_records: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            include_records: true,
        }
    }
}

/// Rebuild the whole corpus: each insight's answer, then its facts, then records
pub fn build_corpus(catalog: &Catalog, store: &Store, options: &CorpusOptions) -> Vec<Snippet> {
    let mut snippets = Vec::new();

    for insight in catalog.insights() {
        snippets.push(Snippet {
            text: insight.answer.clone(),
            source: SnippetSource::Insight {
                key: insight.key.to_string(),
            },
        });
        for (index, fact) in insight.facts.iter().enumerate() {
            snippets.push(Snippet {
                text: fact.clone(),
                source: SnippetSource::Fact {
                    key: insight.key.to_string(),
                    index,
                },
            });
        }
    }

    if options.include_records {
        snippets.extend(store.records().iter().map(|r| Snippet {
            text: format!(
                "Order {} for customer {} in {}, sales {}",
                r.order_number,
                r.customer,
                r.country,
                format_money(r.sales)
            ),
            source: SnippetSource::Record {
                order_number: r.order_number,
                line: r.order_line,
            },
        }));
    }

    tracing::info!(snippets = snippets.len(), "built snippet corpus");
    snippets
}
