//! Hosted language-model fallback for questions nothing local can answer

mod client;
mod error;
mod fallback;

pub use client::{ChatCompletionsClient, ClientConfig, API_KEY_ENV};
pub use error::LlmError;
pub use fallback::{LanguageModel, LlmFallback, Prompt, SYSTEM_PROMPT};
