//! AI task generation pipeline.
//!
//! Turns untrusted free text into trustworthy task records by prompting a
//! generative text provider and validating everything it returns:
//!
//! ```text
//! Prompt Builder -> Model Invocation -> Response Normalizer
//!                -> Schema Validator -> result | Error Classifier
//! ```
//!
//! The pipeline is stateless and request-scoped. Input problems (length cap,
//! credential shape) are rejected before any network I/O; exactly one
//! provider attempt is made per invocation and no failure is retried here.

mod error;
mod gemini;
mod normalize;
mod prompt;
mod validate;

pub use error::{AiError, ProviderError, SchemaViolation, ValidateError};
pub use gemini::GeminiClient;
pub use prompt::MAX_INPUT_CHARS;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::task::{Category, Priority};

/// What the caller wants out of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// A single structured task inferred from free text.
    Enhance,
    /// A breakdown of a task title into several subtasks.
    Subtasks,
}

/// A task record produced by the model and accepted by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// ISO-8601 date string, or `None` when the model suggested no deadline.
    pub suggested_deadline: Option<String>,
}

/// Successful pipeline outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// `Enhance` mode: exactly one task.
    Single(GeneratedTask),
    /// `Subtasks` mode: a non-empty batch.
    Batch(Vec<GeneratedTask>),
}

impl GenerationResult {
    /// All generated tasks, regardless of mode.
    pub fn tasks(&self) -> &[GeneratedTask] {
        match self {
            GenerationResult::Single(task) => std::slice::from_ref(task),
            GenerationResult::Batch(tasks) => tasks,
        }
    }
}

/// Trait for generative text providers.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send one prompt with a system instruction and return the model's raw
    /// text output.
    async fn generate_text(
        &self,
        prompt: &str,
        system: &str,
        credential: &str,
    ) -> Result<String, ProviderError>;
}

/// Run the generation pipeline once.
///
/// Validates the credential shape and input length before any I/O, sends a
/// single bounded request to the provider, normalizes and validates the
/// response, and classifies every failure onto one of the three [`AiError`]
/// kinds.
pub async fn generate(
    client: &dyn GenerativeClient,
    raw_text: &str,
    mode: GenerationMode,
    credential: &str,
) -> Result<GenerationResult, AiError> {
    prompt::validate_credential(credential)?;

    let text = prompt::sanitize_input(raw_text);
    let built = prompt::build_prompt(&text, mode)?;

    let raw = client
        .generate_text(&built.prompt, built.system, credential)
        .await?;

    let normalized = normalize::strip_code_fences(&raw);
    let result = validate::parse_generation(normalized, mode)?;
    Ok(result)
}

/// Turn free text into a single structured task.
pub async fn enhance_task(
    client: &dyn GenerativeClient,
    text: &str,
    credential: &str,
) -> Result<GeneratedTask, AiError> {
    match generate(client, text, GenerationMode::Enhance, credential).await? {
        GenerationResult::Single(task) => Ok(task),
        GenerationResult::Batch(_) => {
            tracing::error!("Enhance pipeline produced a batch result");
            Err(AiError::Generation)
        }
    }
}

/// Break a task title down into several actionable subtasks.
pub async fn suggest_subtasks(
    client: &dyn GenerativeClient,
    title: &str,
    credential: &str,
) -> Result<Vec<GeneratedTask>, AiError> {
    match generate(client, title, GenerationMode::Subtasks, credential).await? {
        GenerationResult::Batch(tasks) => Ok(tasks),
        GenerationResult::Single(_) => {
            tracing::error!("Subtasks pipeline produced a single result");
            Err(AiError::Generation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ENHANCE_REPLY: &str = r#"{"title":"Plan sister's birthday party","description":"Pick a date, book a venue and invite guests","category":"PERSONAL","priority":"MEDIUM","suggestedDeadline":null}"#;

    /// Provider stub that hands out one canned reply and counts calls.
    struct MockProvider {
        reply: Mutex<Option<Result<String, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Mutex::new(Some(Ok(text.to_string()))),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                reply: Mutex::new(Some(Err(err))),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeClient for MockProvider {
        async fn generate_text(
            &self,
            _prompt: &str,
            _system: &str,
            _credential: &str,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("provider called more than once")
        }
    }

    fn valid_key() -> String {
        format!("AIza{}", "a".repeat(35))
    }

    #[tokio::test]
    async fn enhance_end_to_end() {
        let provider = MockProvider::replying(ENHANCE_REPLY);
        let task = enhance_task(&provider, "plan a birthday party for my sister", &valid_key())
            .await
            .unwrap();

        assert_eq!(task.title, "Plan sister's birthday party");
        assert_eq!(
            task.description,
            "Pick a date, book a venue and invite guests"
        );
        assert_eq!(task.category, Category::Personal);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.suggested_deadline, None);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn over_limit_input_never_reaches_provider() {
        let provider = MockProvider::replying(ENHANCE_REPLY);
        let long = "x".repeat(MAX_INPUT_CHARS + 1);

        let err = generate(&provider, &long, GenerationMode::Enhance, &valid_key())
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::Validation(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn markup_does_not_count_toward_the_limit() {
        // 500 payload chars plus markup that the sanitizer removes.
        let input = format!("<div>{}</div>", "x".repeat(MAX_INPUT_CHARS));
        let provider = MockProvider::replying(ENHANCE_REPLY);

        let result = generate(&provider, &input, GenerationMode::Enhance, &valid_key())
            .await
            .unwrap();

        assert_eq!(result.tasks().len(), 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn malformed_credential_never_reaches_provider() {
        let provider = MockProvider::replying(ENHANCE_REPLY);

        let err = generate(&provider, "buy milk", GenerationMode::Enhance, "not-a-key")
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::Validation(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn rate_limit_surfaces_as_quota_exceeded() {
        let provider = MockProvider::failing(ProviderError::RateLimited {
            detail: "RESOURCE_EXHAUSTED".to_string(),
        });

        let err = generate(&provider, "buy milk", GenerationMode::Enhance, &valid_key())
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::QuotaExceeded));
    }

    #[tokio::test]
    async fn timeout_surfaces_as_generation_failure() {
        let provider = MockProvider::failing(ProviderError::Timeout);

        let err = generate(&provider, "buy milk", GenerationMode::Enhance, &valid_key())
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::Generation));
    }

    #[tokio::test]
    async fn fenced_reply_is_normalized_before_validation() {
        let provider = MockProvider::replying(&format!("```json\n{}\n```", ENHANCE_REPLY));

        let task = enhance_task(&provider, "plan a birthday party", &valid_key())
            .await
            .unwrap();

        assert_eq!(task.category, Category::Personal);
    }

    #[tokio::test]
    async fn invalid_reply_surfaces_as_generation_failure() {
        let provider = MockProvider::replying("I could not help with that.");

        let err = enhance_task(&provider, "buy milk", &valid_key())
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::Generation));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn subtasks_lenient_to_single_object() {
        let provider = MockProvider::replying(ENHANCE_REPLY);

        let tasks = suggest_subtasks(&provider, "plan a birthday party", &valid_key())
            .await
            .unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Plan sister's birthday party");
    }
}
