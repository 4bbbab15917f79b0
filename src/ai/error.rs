//! Error taxonomy for the generation pipeline.
//!
//! Every failure collapses onto one of three caller-visible kinds. The
//! specific cause is logged for operators and never surfaced past the kind
//! label and a short human message.

use std::fmt;

use thiserror::Error;

/// Caller-visible outcome of a failed generation request.
///
/// This is a closed set: the API boundary maps it onto HTTP statuses with a
/// single exhaustive match, so nothing is registered at runtime.
#[derive(Debug, Error)]
pub enum AiError {
    /// The caller's input was rejected before any network call was made.
    #[error("{0}")]
    Validation(String),
    /// The provider reported quota exhaustion. Safe to retry with backoff.
    #[error("AI quota exceeded, please try again later")]
    QuotaExceeded,
    /// Anything provider-side: timeout, network fault, unusable output.
    #[error("Failed to process AI request")]
    Generation,
}

/// Failure raised by the model-invocation step.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429 or an explicit resource-exhausted signal.
    #[error("provider rate limited: {detail}")]
    RateLimited { detail: String },
    /// The 30-second wall-clock budget expired.
    #[error("provider call timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The provider envelope itself was unusable (no candidates, bad JSON).
    #[error("unusable provider response: {0}")]
    Malformed(String),
}

/// A single field-level violation of the generated-task contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Path of the offending field, e.g. `priority` or `[2].category`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failure raised by the schema-validation step.
///
/// A parse failure and a contract violation are distinct kinds even though
/// both classify as [`AiError::Generation`] for the caller.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The normalized text was not valid JSON at all.
    #[error("response is not valid JSON: {0}")]
    Malformed(String),
    /// Syntactically valid JSON that breaks the structural contract.
    /// Carries every violation found, not just the first.
    #[error("response violates the task contract: {}", format_violations(.0))]
    Schema(Vec<SchemaViolation>),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ProviderError> for AiError {
    fn from(err: ProviderError) -> Self {
        match &err {
            ProviderError::RateLimited { detail } => {
                tracing::warn!("AI provider rate limited: {}", detail);
                AiError::QuotaExceeded
            }
            _ => {
                tracing::error!("AI generation failed: {}", err);
                AiError::Generation
            }
        }
    }
}

impl From<ValidateError> for AiError {
    fn from(err: ValidateError) -> Self {
        tracing::error!("AI response rejected: {}", err);
        AiError::Generation
    }
}
