//! Document upload handlers

use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::ClaimId;
use domain_claims::Document;
use infra_staging::StagedUpload;

use crate::dto::documents::DocumentMetaResponse;
use crate::error::ApiError;
use crate::AppState;

/// Uploads one or more documents for a claim.
///
/// Files land in the staging area (one batch, one arrival timestamp) and are
/// persisted as document rows. The response maps file name to document
/// metadata.
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(claim_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BTreeMap<String, DocumentMetaResponse>>), ApiError> {
    let claim_id = ClaimId::from(claim_id);
    // 404 before accepting any bytes
    let claim = state.claims.get(claim_id).await?;

    let mut uploads: Vec<StagedUpload> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field
            .file_name()
            .map(str::to_string)
            .or_else(|| field.name().map(str::to_string))
            .ok_or_else(|| ApiError::BadRequest("multipart field without a name".to_string()))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        uploads.push(StagedUpload {
            name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    if uploads.is_empty() {
        return Err(ApiError::BadRequest("no files in upload".to_string()));
    }

    let snapshot = state.staging.append(claim.id, uploads.clone()).await?;

    let mut response = BTreeMap::new();
    for upload in uploads {
        let document = Document::new(claim.id, upload.name, upload.content_type, upload.bytes);
        state.documents.insert(&document).await?;
        let staged_at = snapshot
            .get(&document.name)
            .map(|meta| meta.staged_at)
            .unwrap_or_else(chrono::Utc::now);
        response.insert(
            document.name.clone(),
            DocumentMetaResponse {
                id: document.id,
                content_type: document.content_type.clone(),
                staged_at,
            },
        );
    }

    tracing::info!(claim = %claim.id, files = response.len(), "documents uploaded");
    Ok((StatusCode::CREATED, Json(response)))
}
