//! OpenAI-compatible chat completions over blocking HTTP

use crate::error::LlmError;
use crate::fallback::{LanguageModel, Prompt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GROQ_API_KEY";

const BODY_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-70b-8192".to_string(),
            max_tokens: 800,
            timeout_secs: 30,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct ChatCompletionsClient {
    config: ClientConfig,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl ChatCompletionsClient {
    pub fn new(config: ClientConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential(API_KEY_ENV.to_string()));
        }

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        tracing::info!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout_secs = timeout.as_secs(),
            "created chat completions client"
        );

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Reads the key from `GROQ_API_KEY`
    pub fn from_env(config: ClientConfig) -> Result<Self, LlmError> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| LlmError::MissingCredential(API_KEY_ENV.to_string()))?;
        Self::new(config, key)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs.max(1))
    }

    fn classify(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

impl LanguageModel for ChatCompletionsClient {
    fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.classify(e))?;
        tracing::debug!(status, bytes = body.len(), "chat completion response");
        parse_completion(status, &body)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

fn preview(body: &str) -> String {
    body.trim().chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Map an HTTP status and body to the completion text or a typed error
fn parse_completion(status: u16, body: &str) -> Result<String, LlmError> {
    if !(200..300).contains(&status) {
        return Err(LlmError::Upstream {
            status,
            body: preview(body),
        });
    }

    // Gateways sometimes answer 200 with an HTML error page
    if body.trim_start().starts_with('<') {
        return Err(LlmError::MalformedResponse(format!(
            "HTML instead of JSON: {}",
            preview(body)
        )));
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::MalformedResponse(format!("{e}: {}", preview(body))))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

    if content.trim().is_empty() {
        return Err(LlmError::MalformedResponse("empty completion".to_string()));
    }
    Ok(content)
}
