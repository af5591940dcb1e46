//! Shared setup for commands: config, state paths, pipeline assembly

use crate::cli::{EmbedderKind, GlobalArgs};
use anyhow::Context;
use salesdesk_core::{BuildOptions, Config, Pipeline};
use salesdesk_data::Store;
use salesdesk_index::{Embedder, EmbeddingCache, FastEmbedder, HashEmbedder};
use salesdesk_llm::{ChatCompletionsClient, LanguageModel};
use salesdesk_telemetry::{Paths, QueryLog};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG_FILE: &str = "salesdesk.json";

/// Explicit path, else `./salesdesk.json`, else defaults. Unreadable or invalid files fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !config_path.exists() {
        if path.is_some() {
            tracing::warn!(path = %config_path.display(), "config file not found, using defaults");
        }
        return Config::new();
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "cannot read config, using defaults");
            return Config::new();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "invalid config, using defaults");
            Config::new()
        }
    }
}

pub fn paths(globals: &GlobalArgs) -> anyhow::Result<Paths> {
    match &globals.state_dir {
        Some(dir) => Ok(Paths::rooted_at(dir)),
        None => Paths::new().context("cannot locate state directory"),
    }
}

/// An unreadable history never blocks answering; new entries still go to disk
pub fn open_log(globals: &GlobalArgs) -> anyhow::Result<QueryLog> {
    let path = paths(globals)?.query_log_file();
    Ok(match QueryLog::open(&path) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read query log history");
            QueryLog::append_only(path)
        }
    })
}

pub fn load_store(globals: &GlobalArgs) -> anyhow::Result<Store> {
    Store::load(&globals.data)
        .with_context(|| format!("cannot load dataset {}", globals.data.display()))
}

/// Falls back to hashing when the model cannot be loaded
pub fn embedder(kind: EmbedderKind) -> Arc<dyn Embedder> {
    match kind {
        EmbedderKind::Hash => Arc::new(HashEmbedder::default()),
        EmbedderKind::Fastembed => match FastEmbedder::try_new() {
            Ok(e) => Arc::new(e),
            Err(e) => {
                tracing::warn!(error = %e, "embedding model unavailable, falling back to hashing");
                Arc::new(HashEmbedder::default())
            }
        },
    }
}

pub fn language_model(globals: &GlobalArgs, config: &Config) -> Option<Box<dyn LanguageModel>> {
    if globals.offline {
        return None;
    }
    match ChatCompletionsClient::from_env(config.llm.clone()) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "language model disabled");
            None
        }
    }
}

pub fn build_pipeline(globals: &GlobalArgs) -> anyhow::Result<Pipeline> {
    let config = load_config(globals.config.as_deref());
    let store = load_store(globals)?;
    let paths = paths(globals)?;

    let log = open_log(globals)?;
    let cache = match EmbeddingCache::open(paths.embedding_cache_file()) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::warn!(error = %e, "embedding cache disabled");
            None
        }
    };

    let model = language_model(globals, &config);
    let pipeline = Pipeline::build_with(
        config,
        store,
        embedder(globals.embedder),
        model,
        BuildOptions {
            log: Arc::new(log),
            cache,
        },
    )?;
    Ok(pipeline)
}
