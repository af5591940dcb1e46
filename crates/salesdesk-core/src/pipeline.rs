//! Build-time assembly: store, catalog, corpus, index, router

use crate::config::Config;
use crate::router::{Answer, Router};
use crate::strategy::{InsightStrategy, LlmStrategy, SemanticStrategy};
use chrono::{DateTime, Utc};
use salesdesk_data::Store;
use salesdesk_index::{
    build_corpus, CorpusOptions, Embedder, EmbeddingCache, EmbeddingError, IndexError, SearchHit,
    VectorIndex,
};
use salesdesk_insights::Catalog;
use salesdesk_llm::LanguageModel;
use salesdesk_telemetry::QueryLog;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to build vector index: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Optional collaborators for [`Pipeline::build_with`]
#[derive(Default)]
pub struct BuildOptions {
    pub log: Arc<QueryLog>,
    pub cache: Option<EmbeddingCache>,
}

/// Snapshot for the `status` command
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub rows: usize,
    pub encoding: String,
    pub dropped_columns: Vec<String>,
    pub dataset_fingerprint: String,
    pub insights: usize,
    pub snippets: usize,
    pub embedder: String,
    pub dimension: usize,
    pub language_model: Option<String>,
    pub logged_queries: usize,
    pub built_at: DateTime<Utc>,
}

/// Everything needed to answer queries, immutable once built
pub struct Pipeline {
    config: Config,
    store: Arc<Store>,
    catalog: Arc<Catalog>,
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    log: Arc<QueryLog>,
    language_model: Option<String>,
    router: Router,
    built_at: DateTime<Utc>,
}

impl Pipeline {
    /// In-memory log, no embedding cache
    pub fn build(
        config: Config,
        store: Store,
        embedder: Arc<dyn Embedder>,
        model: Option<Box<dyn LanguageModel>>,
    ) -> Result<Self, PipelineError> {
        Self::build_with(config, store, embedder, model, BuildOptions::default())
    }

    pub fn build_with(
        config: Config,
        store: Store,
        embedder: Arc<dyn Embedder>,
        model: Option<Box<dyn LanguageModel>>,
        options: BuildOptions,
    ) -> Result<Self, PipelineError> {
        let catalog = Arc::new(Catalog::build(&store));
        let corpus = build_corpus(
            &catalog,
            &store,
            &CorpusOptions {
                include_records: config.include_record_snippets,
            },
        );
        let index = Arc::new(match &options.cache {
            Some(cache) => VectorIndex::build_cached(corpus, embedder.as_ref(), cache)?,
            None => VectorIndex::build(corpus, embedder.as_ref())?,
        });

        let log = options.log;
        let mut router = Router::new(log.clone());
        router.register(Box::new(InsightStrategy::new(
            catalog.clone(),
            config.min_overlap,
        )));
        router.register(Box::new(SemanticStrategy::new(
            index.clone(),
            embedder.clone(),
            config.effective_top_k(),
            config.accept_distance,
        )));

        let language_model = model.as_ref().map(|m| m.name().to_string());
        match model {
            Some(model) => router.register(Box::new(LlmStrategy::new(
                model,
                catalog.clone(),
                config.effective_retries(),
                config.overview_facts,
            ))),
            None => tracing::info!("no language model configured, fallback disabled"),
        }

        tracing::info!(
            rows = store.len(),
            insights = catalog.len(),
            snippets = index.len(),
            strategies = router.len(),
            "pipeline ready"
        );

        Ok(Self {
            config,
            store: Arc::new(store),
            catalog,
            index,
            embedder,
            log,
            language_model,
            router,
            built_at: Utc::now(),
        })
    }

    pub fn ask(&self, query: &str) -> Answer {
        self.router.ask(query)
    }

    /// Raw nearest snippets, bypassing the router and the log
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, IndexError> {
        self.index.search(query, self.embedder.as_ref(), k)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn log(&self) -> &QueryLog {
        &self.log
    }

    pub fn status(&self) -> Status {
        let report = self.store.report();
        Status {
            rows: self.store.len(),
            encoding: report.encoding.clone(),
            dropped_columns: report.dropped_columns.clone(),
            dataset_fingerprint: self.catalog.dataset_fingerprint().to_string(),
            insights: self.catalog.len(),
            snippets: self.index.len(),
            embedder: self.index.embedder_id().to_string(),
            dimension: self.index.dimension(),
            language_model: self.language_model.clone(),
            logged_queries: self.log.len(),
            built_at: self.built_at,
        }
    }
}
