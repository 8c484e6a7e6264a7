//! Analysis orchestration
//!
//! One entry point drives the whole flow: validate the request, build the
//! prompt, call the completion service under its deadline, decode the
//! payload, and record the attempt. Recording is attempt-and-ignore: a
//! store failure is logged and the caller still gets the analysis outcome.

use std::sync::Arc;

use serde::Serialize;

use crate::completion::CompletionClient;
use crate::error::{Error, Result};
use crate::parse::parse_analysis;
use crate::prompt::build_prompt;
use crate::store::AttemptStore;
use crate::types::{AnalysisRequest, AnalysisResult, AttemptDraft};

/// Terminal state of one orchestration run.
///
/// Failures still carry a fully-formed placeholder payload so that every
/// caller receives the same shape.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Success(AnalysisResult),
    Failure {
        error: Error,
        placeholder: AnalysisResult,
    },
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&Error> {
        match self {
            AnalysisOutcome::Success(_) => None,
            AnalysisOutcome::Failure { error, .. } => Some(error),
        }
    }

    /// Uniform response shape for serialization.
    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            AnalysisOutcome::Success(result) => ResponseEnvelope {
                error: None,
                result,
            },
            AnalysisOutcome::Failure { error, placeholder } => ResponseEnvelope {
                error: Some(error.to_string()),
                result: placeholder,
            },
        }
    }
}

/// Serialized response for one run: the payload fields at the top level,
/// plus an `error` field present only on failure.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Drives one analysis run end to end.
pub struct Orchestrator {
    completion: CompletionClient,
    store: Option<Arc<dyn AttemptStore>>,
}

impl Orchestrator {
    /// Build an orchestrator. `store` is `None` when persistence is
    /// disabled or unavailable; analysis still runs.
    pub fn new(completion: CompletionClient, store: Option<Arc<dyn AttemptStore>>) -> Self {
        Self { completion, store }
    }

    /// Run one analysis. Always returns an outcome; every run, including
    /// rejected input, is recorded exactly once.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let outcome = match self.run(request).await {
            Ok(result) => AnalysisOutcome::Success(result),
            Err(error) => {
                tracing::warn!(variant = %request.variant, %error, "analysis attempt failed");
                AnalysisOutcome::Failure {
                    error,
                    placeholder: AnalysisResult::placeholder(),
                }
            }
        };

        self.record(request, &outcome);
        outcome
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        if request.text.trim().is_empty() {
            return Err(Error::Validation("input text is empty".to_string()));
        }

        let prompt = build_prompt(request);
        let budget = request.variant.budget();

        tracing::debug!(
            variant = %request.variant,
            input_len = request.text.len(),
            "dispatching completion"
        );
        let raw = self.completion.complete(&prompt, &budget).await?;

        parse_analysis(&raw)
    }

    /// Record the attempt, ignoring store failures.
    fn record(&self, request: &AnalysisRequest, outcome: &AnalysisOutcome) {
        let Some(store) = &self.store else {
            tracing::debug!("store disabled, attempt not recorded");
            return;
        };

        let draft = match outcome {
            AnalysisOutcome::Success(result) => AttemptDraft::success(request, result.clone()),
            AnalysisOutcome::Failure { error, .. } => {
                AttemptDraft::failure(request, error.to_string())
            }
        };

        match store.append(&draft) {
            Ok(id) => tracing::debug!(%id, status = draft.status().as_str(), "attempt recorded"),
            Err(error) => tracing::warn!(%error, "failed to record attempt"),
        }
    }
}
