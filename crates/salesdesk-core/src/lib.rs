//! Query resolution: insight match, then semantic retrieval, then the hosted model

mod config;
mod pipeline;
mod router;
mod strategy;

pub use config::Config;
pub use pipeline::{BuildOptions, Pipeline, PipelineError, Status};
pub use router::{Answer, Router, NO_ANSWER};
pub use salesdesk_telemetry::StrategyTag;
pub use strategy::{
    InsightStrategy, LlmStrategy, Resolution, RouteError, SemanticStrategy, Strategy,
};
