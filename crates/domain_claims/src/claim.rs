//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, CustomerId, DocumentId};

use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Submitted, awaiting release for triage
    Pending,
    /// Released for triage; eligible for automated analysis
    Open,
    /// Picked up by an operator
    InProgress,
    /// Settled
    Closed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Open => "OPEN",
            ClaimStatus::InProgress => "IN_PROGRESS",
            ClaimStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ClaimStatus::Pending),
            "OPEN" => Ok(ClaimStatus::Open),
            "IN_PROGRESS" => Ok(ClaimStatus::InProgress),
            "CLOSED" => Ok(ClaimStatus::Closed),
            other => Err(ClaimError::UnknownEnumValue {
                kind: "claim status",
                value: other.to_string(),
            }),
        }
    }
}

/// Type of claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimType {
    Return,
    Complaint,
    Dispute,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Return => "RETURN",
            ClaimType::Complaint => "COMPLAINT",
            ClaimType::Dispute => "DISPUTE",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RETURN" => Ok(ClaimType::Return),
            "COMPLAINT" => Ok(ClaimType::Complaint),
            "DISPUTE" => Ok(ClaimType::Dispute),
            other => Err(ClaimError::UnknownEnumValue {
                kind: "claim type",
                value: other.to_string(),
            }),
        }
    }
}

/// A customer claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Customer submitting the claim
    pub customer: CustomerId,
    /// Date when the claim was submitted
    pub date: NaiveDate,
    /// Type of claim
    pub claim_type: ClaimType,
    /// Free-text description
    pub description: String,
    /// Primary document (e.g. invoice) linked to the claim
    pub document: Option<DocumentId>,
    /// References to supporting documents
    pub documents: Vec<DocumentId>,
    /// Material number of the claimed item, filled in by analysis
    pub material: Option<i64>,
    /// Quantity of the claimed item
    pub quantity: Decimal,
    /// Unit of measure
    pub unit: String,
    /// Monetary value of the claim
    pub amount: Decimal,
    /// Current status
    pub status: ClaimStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

/// Data for submitting a new claim
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub customer: CustomerId,
    pub date: NaiveDate,
    pub claim_type: ClaimType,
    pub description: String,
    pub document: Option<DocumentId>,
    pub quantity: Decimal,
    pub unit: String,
    pub amount: Decimal,
}

impl Claim {
    /// Creates a freshly submitted claim in `PENDING` status
    pub fn submit(new: NewClaim) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::new_v7(),
            customer: new.customer,
            date: new.date,
            claim_type: new.claim_type,
            description: new.description,
            document: new.document,
            documents: Vec::new(),
            material: None,
            quantity: new.quantity,
            unit: new.unit,
            amount: new.amount,
            status: ClaimStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the status
    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(status) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the material number extracted by analysis
    pub fn set_material(&mut self, material: i64) {
        self.material = Some(material);
        self.updated_at = Utc::now();
    }

    /// True when the claim is eligible for automated triage
    pub fn is_triage_eligible(&self) -> bool {
        self.status == ClaimStatus::Open
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Pending, Open) | (Open, InProgress) | (Open, Closed) | (InProgress, Closed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ClaimStatus::Pending,
            ClaimStatus::Open,
            ClaimStatus::InProgress,
            ClaimStatus::Closed,
        ] {
            let parsed: ClaimStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(ClaimStatus::InProgress.as_str(), "IN_PROGRESS");
        assert!("in_progress".parse::<ClaimStatus>().is_err());
    }
}
