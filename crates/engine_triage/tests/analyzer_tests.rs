//! Integration tests for the claim analyzer loop

use std::sync::Arc;
use std::time::Duration;

use core_kernel::TaskSupervisor;
use domain_claims::{
    Claim, ClaimStatus, ClaimsPort, DamageAssessment, DamageInsight, DocumentInsight, ResultReason,
    ResultStatus, ResultsPort,
};
use engine_triage::ClaimAnalyzer;
use infra_staging::{StagedUpload, StagingStore};
use test_utils::{
    ClaimBuilder, DocumentBuilder, InMemoryClaims, InMemoryDocuments, InMemoryResults,
    ScriptedReasoning,
};

struct Harness {
    claims: Arc<InMemoryClaims>,
    documents: Arc<InMemoryDocuments>,
    results: Arc<InMemoryResults>,
    reasoning: Arc<ScriptedReasoning>,
    staging: Arc<StagingStore>,
    supervisor: Arc<TaskSupervisor>,
    analyzer: Arc<ClaimAnalyzer>,
    _dir: tempfile::TempDir,
}

fn harness(reasoning: ScriptedReasoning) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let claims = Arc::new(InMemoryClaims::new());
    let documents = Arc::new(InMemoryDocuments::new());
    let results = Arc::new(InMemoryResults::new());
    let reasoning = Arc::new(reasoning);
    let staging = Arc::new(StagingStore::new(dir.path()));
    let supervisor = Arc::new(TaskSupervisor::new());
    let analyzer = Arc::new(ClaimAnalyzer::new(
        claims.clone(),
        documents.clone(),
        results.clone(),
        reasoning.clone(),
        staging.clone(),
        supervisor.clone(),
    ));
    Harness {
        claims,
        documents,
        results,
        reasoning,
        staging,
        supervisor,
        analyzer,
        _dir: dir,
    }
}

/// An `OPEN` claim whose primary document is already persisted
fn open_claim_with_primary(h: &Harness) -> Claim {
    let mut claim = ClaimBuilder::new().with_status(ClaimStatus::Open).build();
    let document = DocumentBuilder::for_claim(claim.id)
        .with_name("invoice.png")
        .build();
    claim.document = Some(document.id);
    claim.documents = vec![document.id];
    h.documents.seed(document);
    h.claims.seed(claim.clone());
    claim
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_claim_without_documents_is_rejected() {
    let h = harness(ScriptedReasoning::new());
    let claim = ClaimBuilder::new().with_status(ClaimStatus::Open).build();
    h.claims.seed(claim.clone());

    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.results.len() == 1).await;

    let result = h.results.get(claim.id).await.unwrap().expect("result");
    assert_eq!(result.status, ResultStatus::Rejected);
    assert_eq!(result.reason, Some(ResultReason::NotEnoughDocuments));
    // no reasoning call was made
    assert_eq!(h.reasoning.document_calls(), 0);
    assert_eq!(h.reasoning.set_calls(), 0);
}

#[tokio::test]
async fn test_irrelevant_primary_overrides_damage_analysis() {
    let reasoning = ScriptedReasoning::new()
        .with_document_insight(DocumentInsight {
            relevant: false,
            material: None,
            summary: Some("a postcard".to_string()),
        })
        .with_set_insight(DamageInsight {
            description: Some("severe damage".to_string()),
            department: Some("kitchen".to_string()),
            damage: Some(DamageAssessment::new(0.9, "crushed").unwrap()),
        });
    let h = harness(reasoning);
    let claim = open_claim_with_primary(&h);
    // a supporting photo so the set analysis actually runs
    h.documents.seed(
        DocumentBuilder::for_claim(claim.id)
            .with_name("damage.png")
            .build(),
    );

    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.results.len() == 1).await;

    let result = h.results.get(claim.id).await.unwrap().expect("result");
    assert_eq!(result.status, ResultStatus::Rejected);
    assert_eq!(result.reason, Some(ResultReason::NotRelevant));
    assert_eq!(result.summary.as_deref(), Some("a postcard"));
    assert!(result.damage.is_none());
    assert!(result.department.is_none());
    assert_eq!(h.reasoning.set_calls(), 1);
}

#[tokio::test]
async fn test_extracted_material_is_saved_on_the_claim() {
    let reasoning = ScriptedReasoning::new().with_document_insight(DocumentInsight {
        relevant: true,
        material: Some(400123),
        summary: Some("invoice".to_string()),
    });
    let h = harness(reasoning);
    let claim = open_claim_with_primary(&h);

    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.results.len() == 1).await;

    let result = h.results.get(claim.id).await.unwrap().expect("result");
    assert_eq!(result.status, ResultStatus::Research);
    let saved = h.claims.get(claim.id).await.unwrap();
    assert_eq!(saved.material, Some(400123));
}

#[tokio::test]
async fn test_at_most_one_analysis_per_claim() {
    let h = harness(ScriptedReasoning::new());
    let _claim = open_claim_with_primary(&h);

    h.reasoning.hold();
    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.reasoning.document_calls() == 1).await;

    // the claim is still OPEN and in flight; a second scan must not dispatch
    h.analyzer.poll_once().await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.reasoning.document_calls(), 1);

    h.reasoning.release();
    wait_until(|| h.results.len() == 1).await;
}

#[tokio::test]
async fn test_existing_result_suppresses_reanalysis() {
    let h = harness(ScriptedReasoning::new());
    let claim = open_claim_with_primary(&h);

    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.results.len() == 1).await;
    assert_eq!(h.reasoning.document_calls(), 1);

    // claim is still OPEN (nothing closed it), but the result exists
    let saved = h.claims.get(claim.id).await.unwrap();
    assert_eq!(saved.status, ClaimStatus::Open);

    h.analyzer.poll_once().await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.reasoning.document_calls(), 1);
    assert_eq!(h.results.len(), 1);
}

#[tokio::test]
async fn test_reasoning_failure_leaves_claim_for_retry() {
    let h = harness(ScriptedReasoning::new().failing());
    let claim = open_claim_with_primary(&h);

    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.reasoning.document_calls() == 1).await;
    wait_until(|| h.supervisor.active_count() == 0).await;

    // no result was written, the claim stays OPEN
    assert!(h.results.is_empty());
    assert_eq!(
        h.claims.get(claim.id).await.unwrap().status,
        ClaimStatus::Open
    );

    // next poll retries
    h.reasoning.set_failing(false);
    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.results.len() == 1).await;
}

#[tokio::test]
async fn test_staging_is_cleared_after_successful_analysis() {
    let h = harness(ScriptedReasoning::new());
    let claim = open_claim_with_primary(&h);
    h.staging
        .append(
            claim.id,
            vec![StagedUpload {
                name: "photo.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            }],
        )
        .await
        .unwrap();

    h.analyzer.poll_once().await.unwrap();
    wait_until(|| h.results.len() == 1).await;
    wait_until(|| h.supervisor.active_count() == 0).await;

    assert!(h.staging.get(claim.id).await.is_empty());
}

#[tokio::test]
async fn test_no_dispatch_after_shutdown() {
    let h = harness(ScriptedReasoning::new());
    let _claim = open_claim_with_primary(&h);

    h.supervisor.cancel_all().await;
    h.analyzer.poll_once().await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(h.reasoning.document_calls(), 0);
    assert!(h.results.is_empty());
}

#[test]
fn test_port_adapters_carry_the_domain_port_marker() {
    fn assert_port<T: core_kernel::DomainPort>() {}
    assert_port::<InMemoryClaims>();
    assert_port::<InMemoryDocuments>();
    assert_port::<InMemoryResults>();
    assert_port::<ScriptedReasoning>();
    assert_port::<engine_triage::ReasoningClient>();
}
