//! Prompt assembly around an injected language model

use crate::error::LlmError;

pub const SYSTEM_PROMPT: &str = "You are an expert sales data analyst. Provide clear, concise, and accurate \
responses based on the given context. If the query cannot be directly answered from the context, \
explain that additional information is needed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Text in, text out. Implementations do not retry.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, prompt: &Prompt) -> Result<String, LlmError>;

    /// Short label for logs and status output
    fn name(&self) -> &str {
        "language-model"
    }
}

/// Wraps a model with the analyst prompt
pub struct LlmFallback<M> {
    model: M,
}

impl<M: LanguageModel> LlmFallback<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn build_prompt(query: &str, context: &[String]) -> Prompt {
        Prompt {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("Context:\n{}\n\nQuery: {}", context.join("\n"), query),
        }
    }

    pub fn answer(&self, query: &str, context: &[String]) -> Result<String, LlmError> {
        let prompt = Self::build_prompt(query, context);
        tracing::debug!(
            model = self.model.name(),
            context_lines = context.len(),
            "forwarding query to language model"
        );
        self.model.complete(&prompt)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Prompt>>,
    }

    impl LanguageModel for Recorder {
        fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(prompt.clone());
            Ok("recorded".to_string())
        }
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = LlmFallback::<Recorder>::build_prompt(
            "Why did sales drop?",
            &["In 2005, total sales were $1,791,486.71".to_string(), "second".to_string()],
        );
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert_eq!(
            prompt.user,
            "Context:\nIn 2005, total sales were $1,791,486.71\nsecond\n\nQuery: Why did sales drop?"
        );
    }

    #[test]
    fn test_answer_forwards_once() {
        let fallback = LlmFallback::new(Recorder::default());
        let answer = fallback.answer("q", &[]).unwrap();
        assert_eq!(answer, "recorded");
        assert_eq!(fallback.model().seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_boxed_model() {
        let boxed: Box<dyn LanguageModel> = Box::new(Recorder::default());
        let fallback = LlmFallback::new(boxed);
        assert_eq!(fallback.answer("q", &[]).unwrap(), "recorded");
    }
}
