//! Claims handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimStatus};

use crate::dto::claims::{ClaimResponse, SubmitClaimRequest, UpdateClaimRequest};
use crate::error::ApiError;
use crate::AppState;

/// Submits a new claim; the server forces status `PENDING` regardless of
/// anything the client sends
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let claim = Claim::submit(request.into_new_claim());
    state.claims.insert(&claim).await?;
    tracing::info!(claim = %claim.id, customer = %claim.customer, "claim submitted");
    Ok((StatusCode::CREATED, Json(ClaimResponse::from_claim(claim, None))))
}

/// Lists all claims, each with its analysis result when one exists
pub async fn list_claims(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.claims.list().await?;
    let mut responses = Vec::with_capacity(claims.len());
    for claim in claims {
        let result = state.results.get(claim.id).await?;
        responses.push(ClaimResponse::from_claim(claim, result));
    }
    Ok(Json(responses))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = ClaimId::from(id);
    let claim = state.claims.get(id).await?;
    let result = state.results.get(id).await?;
    Ok(Json(ClaimResponse::from_claim(claim, result)))
}

/// Partially updates a claim.
///
/// A `PENDING` claim's status may only move to `OPEN`; every other requested
/// transition from `PENDING` is rejected with 403. Later transitions follow
/// the claim lifecycle rules.
pub async fn update_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = ClaimId::from(id);
    let mut claim = state.claims.get(id).await?;

    if let Some(description) = request.description {
        claim.description = description;
    }
    if let Some(document) = request.document {
        claim.document = Some(document);
    }
    if let Some(quantity) = request.quantity {
        claim.quantity = quantity;
    }
    if let Some(unit) = request.unit {
        claim.unit = unit;
    }
    if let Some(amount) = request.amount {
        claim.amount = amount;
    }
    if let Some(status) = request.status {
        if claim.status == ClaimStatus::Pending && status != ClaimStatus::Open {
            return Err(ApiError::Forbidden(format!(
                "a PENDING claim may only be released to OPEN, not {}",
                status
            )));
        }
        if status != claim.status {
            claim.update_status(status)?;
        }
    }

    state.claims.save(&claim).await?;
    let result = state.results.get(id).await?;
    Ok(Json(ClaimResponse::from_claim(claim, result)))
}
