//! Precomputed aggregate insights and the keyword intent matcher over them

mod catalog;
mod format;
mod matcher;
mod renderers;

pub use catalog::{Catalog, Insight};
pub use format::{format_count, format_money};
pub use matcher::{normalize, IntentMatch, IntentMatcher, DEFAULT_MIN_OVERLAP};
pub use renderers::{InsightSpec, Rendered, INSIGHTS};
