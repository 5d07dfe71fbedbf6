//! Triage reduction
//!
//! Combines the reasoning insights extracted from a claim's documents into a
//! single [`AnalysisResult`]. The reduction is pure so it can be exercised
//! without a reasoning service.

use serde::{Deserialize, Serialize};

use crate::claim::Claim;
use crate::result::{AnalysisResult, DamageAssessment, ResultReason, ResultStatus};

fn default_relevant() -> bool {
    true
}

/// Insight extracted from the primary document of a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInsight {
    /// Whether the document relates to the claim at all
    #[serde(default = "default_relevant")]
    pub relevant: bool,
    /// Material number identified on the document
    #[serde(default)]
    pub material: Option<i64>,
    /// Short summary of the document contents
    #[serde(default)]
    pub summary: Option<String>,
}

/// Insight extracted from the supporting document set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageInsight {
    /// Description of the claimed issue
    #[serde(default)]
    pub description: Option<String>,
    /// Department the claim should be routed to
    #[serde(default)]
    pub department: Option<String>,
    /// Damage estimate, when visible damage was found
    #[serde(default)]
    pub damage: Option<DamageAssessment>,
}

/// Reduces the per-document insights into the final result for a claim.
///
/// With no insights at all the claim is rejected for lack of documents. An
/// irrelevant primary document rejects the claim outright and discards any
/// damage insight. Everything else is routed to an operator as `RESEARCH`.
pub fn reduce(
    claim: &Claim,
    primary: Option<DocumentInsight>,
    set: Option<DamageInsight>,
) -> AnalysisResult {
    match (primary, set) {
        (None, None) => {
            tracing::debug!(claim = %claim.id, "no insights produced, rejecting");
            AnalysisResult {
                claim: claim.id,
                status: ResultStatus::Rejected,
                reason: Some(ResultReason::NotEnoughDocuments),
                relevant: None,
                summary: None,
                description: None,
                department: None,
                damage: None,
            }
        }
        (Some(doc), _) if !doc.relevant => AnalysisResult {
            claim: claim.id,
            status: ResultStatus::Rejected,
            reason: Some(ResultReason::NotRelevant),
            relevant: Some(false),
            summary: doc.summary,
            description: None,
            department: None,
            damage: None,
        },
        (primary, set) => {
            let relevant = primary.as_ref().map(|d| d.relevant).unwrap_or(true);
            let summary = primary.and_then(|d| d.summary);
            let (description, department, damage) = match set {
                Some(s) => (s.description, s.department, s.damage),
                None => (None, None, None),
            };
            AnalysisResult {
                claim: claim.id,
                status: ResultStatus::Research,
                reason: None,
                relevant: Some(relevant),
                summary,
                description,
                department,
                damage,
            }
        }
    }
}
