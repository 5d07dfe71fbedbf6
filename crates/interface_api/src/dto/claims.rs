//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, CustomerId, DocumentId};
use domain_claims::{
    AnalysisResult, Claim, ClaimStatus, ClaimType, DamageAssessment, NewClaim, ResultReason,
    ResultStatus,
};

#[derive(Debug, Deserialize)]
pub struct SubmitClaimRequest {
    pub customer: CustomerId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub description: String,
    pub document: Option<DocumentId>,
    pub quantity: Decimal,
    pub unit: String,
    pub amount: Decimal,
}

impl SubmitClaimRequest {
    pub fn into_new_claim(self) -> NewClaim {
        NewClaim {
            customer: self.customer,
            date: self.date,
            claim_type: self.claim_type,
            description: self.description,
            document: self.document,
            quantity: self.quantity,
            unit: self.unit,
            amount: self.amount,
        }
    }
}

/// Partial update of a claim; absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateClaimRequest {
    pub status: Option<ClaimStatus>,
    pub description: Option<String>,
    pub document: Option<DocumentId>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ResultReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageAssessment>,
}

impl From<AnalysisResult> for ResultResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            status: result.status,
            reason: result.reason,
            relevant: result.relevant,
            summary: result.summary,
            description: result.description,
            department: result.department,
            damage: result.damage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub customer: CustomerId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentId>,
    pub documents: Vec<DocumentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<i64>,
    pub quantity: Decimal,
    pub unit: String,
    pub amount: Decimal,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultResponse>,
}

impl ClaimResponse {
    pub fn from_claim(claim: Claim, result: Option<AnalysisResult>) -> Self {
        Self {
            id: claim.id,
            customer: claim.customer,
            date: claim.date,
            claim_type: claim.claim_type,
            description: claim.description,
            document: claim.document,
            documents: claim.documents,
            material: claim.material,
            quantity: claim.quantity,
            unit: claim.unit,
            amount: claim.amount,
            status: claim.status,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
            result: result.map(ResultResponse::from),
        }
    }
}
