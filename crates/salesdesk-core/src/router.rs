//! Ordered strategy chain with a single logging point

use crate::strategy::{Resolution, RouteError, Strategy};
use salesdesk_telemetry::{QueryLog, QueryLogEntry, StrategyTag};
use serde::Serialize;
use std::sync::Arc;

/// Returned when every strategy passed and no model is configured
pub const NO_ANSWER: &str = "I couldn't find an answer to that in the sales data, \
and no language model is configured to help further.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub strategy: StrategyTag,
}

pub struct Router {
    strategies: Vec<Box<dyn Strategy>>,
    log: Arc<QueryLog>,
}

impl Router {
    pub fn new(log: Arc<QueryLog>) -> Self {
        Self {
            strategies: Vec::new(),
            log,
        }
    }

    /// Strategies are tried in registration order
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn log(&self) -> &QueryLog {
        &self.log
    }

    /// Resolve a query. Always produces an answer and logs it exactly once.
    pub fn ask(&self, query: &str) -> Answer {
        let mut resolution = Resolution::default();
        let answer = self.resolve(query, &mut resolution);
        tracing::info!(strategy = %answer.strategy, "answered query");
        self.log
            .append(QueryLogEntry::new(query, answer.strategy, answer.text.clone()));
        answer
    }

    fn resolve(&self, query: &str, resolution: &mut Resolution) -> Answer {
        for strategy in &self.strategies {
            let tag = strategy.tag();
            match strategy.attempt(query, resolution) {
                Ok(Some(text)) => return Answer { text, strategy: tag },
                Ok(None) => tracing::debug!(strategy = %tag, "strategy passed"),
                Err(RouteError::Llm(e)) => {
                    tracing::warn!(error = %e, "language model unavailable");
                    return Answer {
                        text: format!(
                            "I'm unable to process this query at the moment ({}).",
                            e.summary()
                        ),
                        strategy: StrategyTag::LlmFailed,
                    };
                }
                Err(e) => {
                    tracing::warn!(strategy = %tag, error = %e, "strategy failed, treating as a miss");
                }
            }
        }
        Answer {
            text: NO_ANSWER.to_string(),
            strategy: StrategyTag::LlmFailed,
        }
    }
}
