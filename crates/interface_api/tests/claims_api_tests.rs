//! HTTP-level tests for the claims API
//!
//! Routes are exercised through `tower::ServiceExt::oneshot` against
//! in-memory port implementations; no database or network is involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use domain_claims::{AnalysisResult, ClaimStatus, ClaimsPort, DocumentsPort, ResultStatus, ResultsPort};
use infra_staging::StagingStore;
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::{ClaimBuilder, InMemoryClaims, InMemoryDocuments, InMemoryResults};

struct TestApp {
    claims: Arc<InMemoryClaims>,
    documents: Arc<InMemoryDocuments>,
    results: Arc<InMemoryResults>,
    staging: Arc<StagingStore>,
    router: axum::Router,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let claims = Arc::new(InMemoryClaims::new());
    let documents = Arc::new(InMemoryDocuments::new());
    let results = Arc::new(InMemoryResults::new());
    let staging = Arc::new(StagingStore::new(dir.path()));
    // lazy pool: never actually connects, and these routes never touch it
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool");
    let state = AppState {
        pool,
        config: ApiConfig::default(),
        claims: claims.clone(),
        documents: documents.clone(),
        results: results.clone(),
        staging: staging.clone(),
    };
    TestApp {
        claims,
        documents,
        results,
        staging,
        router: create_router(state),
        _dir: dir,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn submit_request() -> Request<Body> {
    let payload = json!({
        "customer": uuid::Uuid::new_v4(),
        "date": "2025-06-01",
        "type": "RETURN",
        "description": "Toaster arrived scorched",
        "quantity": "1",
        "unit": "EA",
        "amount": "39.90"
    });
    Request::builder()
        .method("POST")
        .uri("/api/v1/claims")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn test_submitted_claims_start_pending() {
    let app = test_app();
    let response = app.router.oneshot(submit_request()).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["type"], "RETURN");
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn test_pending_claim_may_only_be_released_to_open() {
    let app = test_app();
    let claim = ClaimBuilder::new().build();
    app.claims.seed(claim.clone());

    // PENDING -> CLOSED is forbidden
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/claims/{}", claim.id.as_uuid()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "CLOSED"}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // PENDING -> OPEN is the one allowed release
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/claims/{}", claim.id.as_uuid()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "OPEN"}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let saved = app.claims.get(claim.id).await.expect("claim");
    assert_eq!(saved.status, ClaimStatus::Open);
}

#[tokio::test]
async fn test_patch_unknown_claim_is_404() {
    let app = test_app();
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/claims/{}", uuid::Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "OPEN"}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_nests_analysis_results() {
    let app = test_app();
    let claim = ClaimBuilder::new().with_status(ClaimStatus::Open).build();
    app.claims.seed(claim.clone());
    app.results
        .insert(&AnalysisResult {
            claim: claim.id,
            status: ResultStatus::Research,
            reason: None,
            relevant: Some(true),
            summary: Some("an invoice".to_string()),
            description: None,
            department: Some("kitchen".to_string()),
            damage: None,
        })
        .await
        .expect("seed result");

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/v1/claims")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let listed = body.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["result"]["status"], "RESEARCH");
    assert_eq!(listed[0]["result"]["department"], "kitchen");
}

#[tokio::test]
async fn test_document_upload_stages_and_persists() {
    let app = test_app();
    let claim = ClaimBuilder::new().build();
    app.claims.seed(claim.clone());

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fakebytes\r\n\
         --{boundary}--\r\n"
    );
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/documents/{}", claim.id.as_uuid()))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["photo.png"]["content_type"], "image/png");

    // persisted as a document row and staged on disk
    let persisted = app.documents.find_by_claim(claim.id).await.expect("documents");
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].data, b"fakebytes");
    assert!(app.staging.get(claim.id).await.contains_key("photo.png"));
}

#[tokio::test]
async fn test_upload_for_unknown_claim_is_404() {
    let app = test_app();
    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         x\r\n\
         --{boundary}--\r\n"
    );
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/documents/{}", uuid::Uuid::new_v4()))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
