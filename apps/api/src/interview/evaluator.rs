//! Response evaluator — scores one answer via the model with a two-tier fallback.
//!
//! The model's output format drifts; that is expected, not exceptional.
//! - model unreachable (transport, status, timeout) → `Evaluation::unreachable_default`
//! - model answered, but no `{ ... }` object in the text → `Evaluation::format_drift_default`
//! - object found, but it does not parse into a complete `Evaluation` → unreachable default

use thiserror::Error;
use tracing::{debug, warn};

use super::models::{Evaluation, EvaluationSource};
use super::prompts::build_evaluation_prompt;
use crate::llm_client::{extract_json_object, LlmError, TextGenerator};

/// Why a model evaluation could not be used.
#[derive(Debug, Error)]
pub enum EvaluationFailure {
    #[error("model call failed: {0}")]
    Unreachable(#[from] LlmError),

    #[error("model reply contained no structured object")]
    NoStructuredObject,

    #[error("model reply object was invalid: {0}")]
    InvalidObject(#[from] serde_json::Error),
}

impl EvaluationFailure {
    pub fn evaluation_source(&self) -> EvaluationSource {
        match self {
            Self::NoStructuredObject => EvaluationSource::FormatFallback,
            Self::Unreachable(_) | Self::InvalidObject(_) => EvaluationSource::UnreachableFallback,
        }
    }

    /// The fixed evaluation substituted for this failure.
    pub fn fallback(&self) -> Evaluation {
        match self.evaluation_source() {
            EvaluationSource::FormatFallback => Evaluation::format_drift_default(),
            _ => Evaluation::unreachable_default(),
        }
    }
}

/// Asks the model to score `response_text` and parses its reply.
pub async fn try_evaluate(
    llm: &dyn TextGenerator,
    question: &str,
    response_text: &str,
) -> Result<Evaluation, EvaluationFailure> {
    let prompt = build_evaluation_prompt(question, response_text);
    let reply = llm.generate(&prompt).await?;

    let object = extract_json_object(&reply).ok_or(EvaluationFailure::NoStructuredObject)?;
    Ok(serde_json::from_str::<Evaluation>(object)?)
}

/// Scores an answer. Never fails: any failure yields its fixed fallback evaluation.
pub async fn evaluate(
    llm: &dyn TextGenerator,
    question: &str,
    response_text: &str,
) -> (Evaluation, EvaluationSource) {
    match try_evaluate(llm, question, response_text).await {
        Ok(evaluation) => {
            debug!(
                "Evaluation parsed: overall={} technical={} completeness={} clarity={}",
                evaluation.overall_score,
                evaluation.technical_accuracy,
                evaluation.completeness,
                evaluation.clarity
            );
            (evaluation, EvaluationSource::Model)
        }
        Err(failure) => {
            warn!("Evaluation fell back ({:?}): {failure}", failure.evaluation_source());
            (failure.fallback(), failure.evaluation_source())
        }
    }
}
