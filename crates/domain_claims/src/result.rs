//! Triage analysis results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::ClaimId;

use crate::error::ClaimError;

/// Recommended disposition for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    /// Claim should be settled without review
    Approved,
    /// Claim should be declined
    Rejected,
    /// Claim needs a human operator
    Research,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Approved => "APPROVED",
            ResultStatus::Rejected => "REJECTED",
            ResultStatus::Research => "RESEARCH",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVED" => Ok(ResultStatus::Approved),
            "REJECTED" => Ok(ResultStatus::Rejected),
            "RESEARCH" => Ok(ResultStatus::Research),
            other => Err(ClaimError::UnknownEnumValue {
                kind: "result status",
                value: other.to_string(),
            }),
        }
    }
}

/// Machine-readable reason behind a disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultReason {
    /// Claimed amount is below the auto-approval threshold
    ClaimAmountBelowThreshold,
    /// Primary document does not relate to the claim
    NotRelevant,
    /// No documents were provided for analysis
    NotEnoughDocuments,
    /// Documents were present but did not yield a usable signal
    NotEnoughData,
}

impl ResultReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultReason::ClaimAmountBelowThreshold => "CLAIM_AMOUNT_BELOW_THRESHOLD",
            ResultReason::NotRelevant => "NOT_RELEVANT",
            ResultReason::NotEnoughDocuments => "NOT_ENOUGH_DOCUMENTS",
            ResultReason::NotEnoughData => "NOT_ENOUGH_DATA",
        }
    }
}

impl fmt::Display for ResultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultReason {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLAIM_AMOUNT_BELOW_THRESHOLD" => Ok(ResultReason::ClaimAmountBelowThreshold),
            "NOT_RELEVANT" => Ok(ResultReason::NotRelevant),
            "NOT_ENOUGH_DOCUMENTS" => Ok(ResultReason::NotEnoughDocuments),
            "NOT_ENOUGH_DATA" => Ok(ResultReason::NotEnoughData),
            other => Err(ClaimError::UnknownEnumValue {
                kind: "result reason",
                value: other.to_string(),
            }),
        }
    }
}

/// Damage estimate extracted from the supporting document set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAssessment {
    /// Severity factor in `[0.0, 1.0]`
    pub factor: f64,
    /// Short description of the observed damage
    pub damage: String,
}

impl DamageAssessment {
    /// Validates the severity factor range
    pub fn new(factor: f64, damage: impl Into<String>) -> Result<Self, ClaimError> {
        if !(0.0..=1.0).contains(&factor) || !factor.is_finite() {
            return Err(ClaimError::DamageFactorOutOfRange(factor));
        }
        Ok(Self {
            factor,
            damage: damage.into(),
        })
    }
}

/// Outcome of running triage analysis on a claim
///
/// At most one result exists per claim. An existing result marks the claim
/// as already analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Claim this result belongs to
    pub claim: ClaimId,
    /// Recommended disposition
    pub status: ResultStatus,
    /// Reason behind the disposition, when one applies
    pub reason: Option<ResultReason>,
    /// Whether the primary document relates to the claim
    pub relevant: Option<bool>,
    /// Summary of the primary document
    pub summary: Option<String>,
    /// Description of the claimed issue from the document set
    pub description: Option<String>,
    /// Department the claim should be routed to
    pub department: Option<String>,
    /// Damage estimate from the document set
    pub damage: Option<DamageAssessment>,
}
