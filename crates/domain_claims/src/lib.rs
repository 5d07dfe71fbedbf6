//! Claims Triage Domain
//!
//! This crate implements the claim lifecycle from submission through automated
//! triage: the claim and document entities, the analysis result written once
//! per claim, the pure triage reduction that turns reasoning-service output
//! into a verdict, and the port traits the analyzer and HTTP layer depend on.
//!
//! # Claim Lifecycle
//!
//! ```text
//! PENDING -> OPEN -> IN_PROGRESS -> CLOSED
//! ```
//!
//! Only `OPEN` claims are picked up by the analyzer; a claim that already has
//! an analysis result is never analyzed again.

pub mod claim;
pub mod document;
pub mod result;
pub mod triage;
pub mod ports;
pub mod error;

pub use claim::{Claim, ClaimStatus, ClaimType, NewClaim};
pub use document::Document;
pub use result::{AnalysisResult, DamageAssessment, ResultReason, ResultStatus};
pub use triage::{DamageInsight, DocumentInsight};
pub use ports::{ClaimsPort, DocumentsPort, ReasoningPort, ResultsPort};
pub use error::ClaimError;
