//! Integration tests for the analysis orchestration pipeline
//!
//! These tests drive the orchestrator end to end over stub transports and an
//! in-memory store to verify the full validate, complete, decode, record flow.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use textlens_core::completion::{CompletionClient, CompletionTransport};
use textlens_core::error::{Error, Result};
use textlens_core::store::{AttemptStore, Database};
use textlens_core::types::{
    AnalysisRequest, AttemptStatus, CompletionBudget, DomainVariant,
};
use textlens_core::{AnalysisOutcome, Orchestrator};

const PAYLOAD: &str = r#"{
    "themes": ["hiring"],
    "people": ["Ana", "Bo"],
    "todos": ["Ana to draft the offer", "schedule the onsite, assigned to Bo"],
    "summaryParagraphs": ["The team agreed to move forward."],
    "qa": [{"question": "When do we start?", "answer": "Next month."}],
    "outline": {"id": "root", "label": "Hiring", "children": []}
}"#;

/// Transport that returns a fixed body without touching the network.
struct CannedTransport {
    body: String,
}

#[async_trait]
impl CompletionTransport for CannedTransport {
    async fn send(&self, _model: &str, _prompt: &str, _budget: &CompletionBudget) -> Result<String> {
        Ok(self.body.clone())
    }
}

/// Transport that never completes, for deadline tests.
struct StalledTransport;

#[async_trait]
impl CompletionTransport for StalledTransport {
    async fn send(&self, _model: &str, _prompt: &str, _budget: &CompletionBudget) -> Result<String> {
        std::future::pending().await
    }
}

/// Transport that fails with a fixed upstream error.
struct FailingTransport {
    status: u16,
}

#[async_trait]
impl CompletionTransport for FailingTransport {
    async fn send(&self, _model: &str, _prompt: &str, _budget: &CompletionBudget) -> Result<String> {
        Err(Error::UpstreamHttp { status: self.status })
    }
}

/// Store whose appends always fail, for degradation tests.
struct BrokenStore;

impl AttemptStore for BrokenStore {
    fn append(&self, _draft: &textlens_core::types::AttemptDraft) -> Result<String> {
        Err(Error::Store("disk full".to_string()))
    }
    fn list(&self) -> Result<Vec<textlens_core::types::AnalysisAttempt>> {
        Err(Error::Store("disk full".to_string()))
    }
    fn get(&self, _id: &str) -> Result<Option<textlens_core::types::AnalysisAttempt>> {
        Err(Error::Store("disk full".to_string()))
    }
    fn delete(&self, _id: &str) -> Result<()> {
        Err(Error::Store("disk full".to_string()))
    }
    fn health(&self) -> Result<textlens_core::StoreHealth> {
        Err(Error::Store("disk full".to_string()))
    }
}

fn memory_store() -> Arc<Database> {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    Arc::new(db)
}

fn orchestrator_over(
    transport: Box<dyn CompletionTransport>,
    store: Option<Arc<dyn AttemptStore>>,
) -> Orchestrator {
    let client = CompletionClient::with_transport(transport, "test-model", Duration::from_secs(5));
    Orchestrator::new(client, store)
}

#[tokio::test]
async fn test_successful_run_records_success() {
    let store = memory_store();
    let orchestrator = orchestrator_over(
        Box::new(CannedTransport { body: PAYLOAD.to_string() }),
        Some(store.clone()),
    );

    let request = AnalysisRequest::new("meeting notes about hiring", DomainVariant::General);
    let outcome = orchestrator.analyze(&request).await;

    let AnalysisOutcome::Success(result) = outcome else {
        panic!("expected success");
    };
    assert_eq!(result.themes, vec!["hiring"]);
    assert_eq!(result.people, vec!["Ana", "Bo"]);

    let attempts = store.list().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].status, AttemptStatus::Success);
    assert_eq!(attempts[0].input_text, "meeting notes about hiring");
    assert_eq!(attempts[0].variant, DomainVariant::General);
    assert!(attempts[0].result.is_some());
}

#[tokio::test]
async fn test_fenced_payload_decodes() {
    let fenced = format!("```json\n{}\n```", PAYLOAD);
    let orchestrator = orchestrator_over(Box::new(CannedTransport { body: fenced }), None);

    let request = AnalysisRequest::new("notes", DomainVariant::Education);
    let outcome = orchestrator.analyze(&request).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_malformed_output_yields_placeholder_envelope() {
    let store = memory_store();
    let orchestrator = orchestrator_over(
        Box::new(CannedTransport { body: "sorry, no JSON today".to_string() }),
        Some(store.clone()),
    );

    let request = AnalysisRequest::new("notes", DomainVariant::Medical);
    let outcome = orchestrator.analyze(&request).await;
    assert!(!outcome.is_success());

    let envelope = outcome.into_envelope();
    assert!(envelope.error.is_some());
    // the placeholder keeps the response shape intact
    assert!(!envelope.result.themes.is_empty());

    let json = serde_json::to_value(&envelope).unwrap();
    assert!(json.get("error").is_some());
    assert!(json.get("summaryParagraphs").is_some());

    let attempts = store.list().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].status, AttemptStatus::Error);
    assert!(attempts[0].result.is_none());
    assert!(attempts[0].error_message.is_some());
}

#[tokio::test]
async fn test_upstream_failure_is_recorded_as_error() {
    let store = memory_store();
    let orchestrator = orchestrator_over(
        Box::new(FailingTransport { status: 502 }),
        Some(store.clone()),
    );

    let request = AnalysisRequest::new("notes", DomainVariant::Sales);
    let outcome = orchestrator.analyze(&request).await;

    match outcome.error() {
        Some(Error::UpstreamHttp { status }) => assert_eq!(*status, 502),
        other => panic!("expected upstream error, got {:?}", other),
    }

    let attempts = store.list().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].status, AttemptStatus::Error);
    assert!(attempts[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("502"));
}

#[tokio::test]
async fn test_empty_input_rejected_and_recorded() {
    let store = memory_store();
    let orchestrator = orchestrator_over(
        Box::new(CannedTransport { body: PAYLOAD.to_string() }),
        Some(store.clone()),
    );

    let request = AnalysisRequest::new("   \n\t ", DomainVariant::General);
    let outcome = orchestrator.analyze(&request).await;

    assert!(matches!(outcome.error(), Some(Error::Validation(_))));
    assert!(outcome.error().unwrap().is_invalid_input());

    // rejected input still lands in the history
    let attempts = store.list().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].status, AttemptStatus::Error);
}

#[tokio::test]
async fn test_broken_store_does_not_change_outcome() {
    let orchestrator = orchestrator_over(
        Box::new(CannedTransport { body: PAYLOAD.to_string() }),
        Some(Arc::new(BrokenStore)),
    );

    let request = AnalysisRequest::new("notes", DomainVariant::General);
    let outcome = orchestrator.analyze(&request).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_disabled_store_still_analyzes() {
    let orchestrator = orchestrator_over(
        Box::new(CannedTransport { body: PAYLOAD.to_string() }),
        None,
    );

    let request = AnalysisRequest::new("notes", DomainVariant::General);
    assert!(orchestrator.analyze(&request).await.is_success());
}

#[tokio::test]
async fn test_deadline_bounds_a_stalled_upstream() {
    let client = CompletionClient::with_transport(
        Box::new(StalledTransport),
        "test-model",
        Duration::from_millis(100),
    );
    let orchestrator = Orchestrator::new(client, None);

    let request = AnalysisRequest::new("notes", DomainVariant::General);
    let start = Instant::now();
    let outcome = orchestrator.analyze(&request).await;
    let elapsed = start.elapsed();

    assert!(matches!(outcome.error(), Some(Error::UpstreamTimeout(_))));
    assert!(elapsed < Duration::from_secs(2), "deadline not enforced: {:?}", elapsed);
}

#[tokio::test]
async fn test_history_round_trip_newest_first() {
    let store = memory_store();
    let orchestrator = orchestrator_over(
        Box::new(CannedTransport { body: PAYLOAD.to_string() }),
        Some(store.clone()),
    );

    for text in ["first", "second", "third"] {
        orchestrator
            .analyze(&AnalysisRequest::new(text, DomainVariant::General))
            .await;
    }

    let attempts = store.list().unwrap();
    let texts: Vec<&str> = attempts.iter().map(|a| a.input_text.as_str()).collect();
    assert_eq!(texts, vec!["third", "second", "first"]);

    // delete the newest, the rest keep their order
    let newest = attempts[0].id.clone();
    store.delete(&newest).unwrap();
    let remaining: Vec<String> = store
        .list()
        .unwrap()
        .into_iter()
        .map(|a| a.input_text)
        .collect();
    assert_eq!(remaining, vec!["second", "first"]);
}
