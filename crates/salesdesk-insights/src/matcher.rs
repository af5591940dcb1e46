//! Keyword-overlap intent matching against the insight catalog

use crate::catalog::{Catalog, Insight};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const DEFAULT_MIN_OVERLAP: f64 = 0.7;

/// Filler words ignored in trigger phrases so "sales by year" scores on "sales year"
const PHRASE_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "by", "in", "per", "for", "is", "are", "was", "what", "which", "who",
    "how", "me", "show", "our", "my", "to", "and", "do", "does",
];

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Pattern is a literal and always compiles
    RE.get_or_init(|| Regex::new(r"[a-z0-9]+").unwrap())
}

/// Lowercase and split on anything that isn't a letter or digit
pub fn normalize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn phrase_tokens(phrase: &str) -> Vec<String> {
    normalize(phrase)
        .into_iter()
        .filter(|t| !PHRASE_STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Fraction of the phrase's content tokens present in the query
fn overlap(query_tokens: &HashSet<String>, phrase: &str) -> f64 {
    let tokens = phrase_tokens(phrase);
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens.iter().filter(|t| query_tokens.contains(*t)).count();
    hits as f64 / tokens.len() as f64
}

#[derive(Debug, Clone, Copy)]
pub struct IntentMatch<'a> {
    pub insight: &'a Insight,
    pub score: f64,
}

/// Scores a query against every insight's trigger phrases
pub struct IntentMatcher<'a> {
    catalog: &'a Catalog,
    min_overlap: f64,
}

impl<'a> IntentMatcher<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_min_overlap(catalog, DEFAULT_MIN_OVERLAP)
    }

    pub fn with_min_overlap(catalog: &'a Catalog, min_overlap: f64) -> Self {
        Self {
            catalog,
            min_overlap,
        }
    }

    /// Best scoring insight and its score, whether or not it clears the threshold
    pub fn best(&self, query: &str) -> Option<IntentMatch<'a>> {
        let query_tokens: HashSet<String> = normalize(query).into_iter().collect();
        if query_tokens.is_empty() {
            return None;
        }

        let mut best: Option<IntentMatch<'a>> = None;
        for insight in self.catalog.insights() {
            let score = insight
                .triggers
                .iter()
                .map(|phrase| overlap(&query_tokens, phrase))
                .fold(0.0, f64::max);
            // Strictly greater keeps the earlier insight on ties
            if best.map_or(true, |b| score > b.score) {
                best = Some(IntentMatch { insight, score });
            }
        }
        best
    }

    /// Matched insight, only when its score strictly exceeds the threshold
    pub fn find(&self, query: &str) -> Option<IntentMatch<'a>> {
        let hit = self.best(query)?;
        tracing::debug!(
            insight = hit.insight.key,
            score = hit.score,
            threshold = self.min_overlap,
            "intent score"
        );
        (hit.score > self.min_overlap).then_some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdesk_data::{LoadOptions, Store};

    fn catalog() -> Catalog {
        let csv = "ORDERNUMBER,QUANTITYORDERED,PRICEEACH,SALES,ORDERDATE,STATUS,PRODUCTLINE,CUSTOMERNAME,COUNTRY,TERRITORY,DEALSIZE\n\
                   1,10,100,1000,1/6/2003 0:00,Shipped,Classic Cars,Alpha Co,USA,NA,Small\n\
                   2,20,100,2000,2/6/2004 0:00,Cancelled,Motorcycles,Beta Ltd,France,EMEA,Medium\n";
        let store = Store::from_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        Catalog::build(&store)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("What's the TOP customer, in 2003?"),
            vec!["what", "s", "the", "top", "customer", "in", "2003"]
        );
        assert!(normalize("?!...").is_empty());
    }

    #[test]
    fn test_phrase_stop_words_removed() {
        assert_eq!(phrase_tokens("sales by product line"), vec!["sales", "product", "line"]);
    }

    #[test]
    fn test_matches_top_customer() {
        let catalog = catalog();
        let matcher = IntentMatcher::new(&catalog);
        let hit = matcher.find("Who is the top customer?").unwrap();
        assert_eq!(hit.insight.key, "top_customer");
        assert_eq!(hit.score, 1.0);
    }

    #[test]
    fn test_matches_status_distribution() {
        let catalog = catalog();
        let matcher = IntentMatcher::new(&catalog);
        let hit = matcher
            .find("What is the distribution of order statuses?")
            .unwrap();
        assert_eq!(hit.insight.key, "order_status_distribution");
    }

    #[test]
    fn test_matches_territory_and_year() {
        let catalog = catalog();
        let matcher = IntentMatcher::new(&catalog);
        assert_eq!(
            matcher.find("Show me sales by territory").unwrap().insight.key,
            "sales_by_territory"
        );
        assert_eq!(
            matcher.find("yearly sales please").unwrap().insight.key,
            "sales_by_year"
        );
    }

    #[test]
    fn test_partial_overlap_rejected() {
        let catalog = catalog();
        let matcher = IntentMatcher::new(&catalog);
        // "total sales" hits half of "sales by year" at best
        assert!(matcher.find("total sales in 2003").is_none());
        assert!(matcher.find("tell me a joke").is_none());
        assert!(matcher.find("").is_none());
    }

    #[test]
    fn test_threshold_is_strict() {
        let catalog = catalog();
        // Score of exactly 1.0 must not pass a 1.0 threshold
        let matcher = IntentMatcher::with_min_overlap(&catalog, 1.0);
        assert!(matcher.find("top customer").is_none());
        assert!(matcher.best("top customer").is_some());
    }

    #[test]
    fn test_tie_prefers_declaration_order() {
        let catalog = catalog();
        let matcher = IntentMatcher::new(&catalog);
        // Both "top customer" and "top customers" phrases fully match
        let hit = matcher.find("top customer customers").unwrap();
        assert_eq!(hit.insight.key, "top_customer");
    }
}
