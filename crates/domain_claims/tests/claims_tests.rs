//! Integration tests for the claims domain

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::CustomerId;
use domain_claims::{
    triage, Claim, ClaimStatus, ClaimType, DamageAssessment, DamageInsight, DocumentInsight,
    NewClaim, ResultReason, ResultStatus,
};

fn sample_claim() -> Claim {
    Claim::submit(NewClaim {
        customer: CustomerId::new(),
        date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        claim_type: ClaimType::Return,
        description: "Kettle arrived with a dented base".to_string(),
        document: None,
        quantity: dec!(1),
        unit: "EA".to_string(),
        amount: dec!(49.90),
    })
}

#[test]
fn test_submit_starts_pending() {
    let claim = sample_claim();
    assert_eq!(claim.status, ClaimStatus::Pending);
    assert!(claim.material.is_none());
    assert!(!claim.is_triage_eligible());
}

#[test]
fn test_lifecycle_happy_path() {
    let mut claim = sample_claim();
    claim.update_status(ClaimStatus::Open).unwrap();
    assert!(claim.is_triage_eligible());
    claim.update_status(ClaimStatus::InProgress).unwrap();
    claim.update_status(ClaimStatus::Closed).unwrap();
    assert_eq!(claim.status, ClaimStatus::Closed);
}

#[test]
fn test_open_can_close_directly() {
    let mut claim = sample_claim();
    claim.update_status(ClaimStatus::Open).unwrap();
    claim.update_status(ClaimStatus::Closed).unwrap();
}

#[test]
fn test_invalid_transitions_rejected() {
    let mut claim = sample_claim();
    assert!(claim.update_status(ClaimStatus::InProgress).is_err());
    assert!(claim.update_status(ClaimStatus::Closed).is_err());

    claim.update_status(ClaimStatus::Open).unwrap();
    claim.update_status(ClaimStatus::Closed).unwrap();
    // Closed is terminal
    assert!(claim.update_status(ClaimStatus::Open).is_err());
    assert!(claim.update_status(ClaimStatus::InProgress).is_err());
}

#[test]
fn test_reduce_without_insights_rejects() {
    let claim = sample_claim();
    let result = triage::reduce(&claim, None, None);
    assert_eq!(result.claim, claim.id);
    assert_eq!(result.status, ResultStatus::Rejected);
    assert_eq!(result.reason, Some(ResultReason::NotEnoughDocuments));
    assert!(result.damage.is_none());
}

#[test]
fn test_reduce_irrelevant_primary_discards_damage() {
    let claim = sample_claim();
    let primary = DocumentInsight {
        relevant: false,
        material: Some(400123),
        summary: Some("Invoice for garden furniture".to_string()),
    };
    let set = DamageInsight {
        description: Some("Broken armrest".to_string()),
        department: Some("furniture".to_string()),
        damage: Some(DamageAssessment::new(0.4, "cracked").unwrap()),
    };
    let result = triage::reduce(&claim, Some(primary), Some(set));
    assert_eq!(result.status, ResultStatus::Rejected);
    assert_eq!(result.reason, Some(ResultReason::NotRelevant));
    assert_eq!(result.relevant, Some(false));
    assert_eq!(
        result.summary.as_deref(),
        Some("Invoice for garden furniture")
    );
    assert!(result.description.is_none());
    assert!(result.department.is_none());
    assert!(result.damage.is_none());
}

#[test]
fn test_reduce_relevant_primary_routes_to_research() {
    let claim = sample_claim();
    let primary = DocumentInsight {
        relevant: true,
        material: Some(400123),
        summary: Some("Invoice for a kettle".to_string()),
    };
    let set = DamageInsight {
        description: Some("Dented base".to_string()),
        department: Some("kitchen".to_string()),
        damage: Some(DamageAssessment::new(0.25, "dent").unwrap()),
    };
    let result = triage::reduce(&claim, Some(primary), Some(set));
    assert_eq!(result.status, ResultStatus::Research);
    assert!(result.reason.is_none());
    assert_eq!(result.relevant, Some(true));
    assert_eq!(result.summary.as_deref(), Some("Invoice for a kettle"));
    assert_eq!(result.description.as_deref(), Some("Dented base"));
    assert_eq!(result.department.as_deref(), Some("kitchen"));
    assert_eq!(result.damage.as_ref().map(|d| d.factor), Some(0.25));
}

#[test]
fn test_reduce_set_only_defaults_relevant() {
    let claim = sample_claim();
    let set = DamageInsight {
        description: Some("Scratched casing".to_string()),
        department: None,
        damage: None,
    };
    let result = triage::reduce(&claim, None, Some(set));
    assert_eq!(result.status, ResultStatus::Research);
    assert_eq!(result.relevant, Some(true));
    assert!(result.summary.is_none());
}

#[test]
fn test_document_insight_relevance_defaults_true() {
    let insight: DocumentInsight =
        serde_json::from_str(r#"{"material": 400123, "summary": "invoice"}"#).unwrap();
    assert!(insight.relevant);
}

proptest! {
    #[test]
    fn prop_rejected_results_carry_a_reason(
        relevant in any::<bool>(),
        has_primary in any::<bool>(),
        has_set in any::<bool>(),
    ) {
        let claim = sample_claim();
        let primary = has_primary.then(|| DocumentInsight {
            relevant,
            material: None,
            summary: None,
        });
        let set = has_set.then(|| DamageInsight {
            description: None,
            department: None,
            damage: None,
        });
        let result = triage::reduce(&claim, primary, set);
        if result.status == ResultStatus::Rejected {
            prop_assert!(result.reason.is_some());
        } else {
            prop_assert_eq!(result.status, ResultStatus::Research);
        }
    }

    #[test]
    fn prop_damage_factor_validation(factor in -2.0f64..3.0) {
        let assessment = DamageAssessment::new(factor, "damage");
        prop_assert_eq!(assessment.is_ok(), (0.0..=1.0).contains(&factor));
    }
}
