//! Outbound ports of the claims domain
//!
//! Adapters (database repositories, reasoning clients, in-memory test
//! doubles) implement these traits. Domain and engine code depends on the
//! traits only.

use async_trait::async_trait;

use core_kernel::{ClaimId, DocumentId, DomainPort, PortError};

use crate::claim::Claim;
use crate::document::Document;
use crate::result::AnalysisResult;
use crate::triage::{DamageInsight, DocumentInsight};

/// Persistence port for claims
#[async_trait]
pub trait ClaimsPort: DomainPort {
    async fn insert(&self, claim: &Claim) -> Result<(), PortError>;

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;

    async fn list(&self) -> Result<Vec<Claim>, PortError>;

    /// Claims eligible for automated triage
    async fn find_open(&self) -> Result<Vec<Claim>, PortError>;

    /// Persists updated fields of an existing claim
    async fn save(&self, claim: &Claim) -> Result<(), PortError>;
}

/// Persistence port for claim documents
#[async_trait]
pub trait DocumentsPort: DomainPort {
    async fn insert(&self, document: &Document) -> Result<(), PortError>;

    async fn get(&self, id: DocumentId) -> Result<Option<Document>, PortError>;

    async fn find_by_claim(&self, claim: ClaimId) -> Result<Vec<Document>, PortError>;
}

/// Persistence port for analysis results
#[async_trait]
pub trait ResultsPort: DomainPort {
    async fn insert(&self, result: &AnalysisResult) -> Result<(), PortError>;

    async fn get(&self, claim: ClaimId) -> Result<Option<AnalysisResult>, PortError>;

    async fn exists(&self, claim: ClaimId) -> Result<bool, PortError>;
}

/// Port to the external multimodal reasoning service
#[async_trait]
pub trait ReasoningPort: DomainPort {
    /// Analyzes the primary document of a claim against its description
    async fn analyze_document(
        &self,
        document: &Document,
        claim_description: &str,
    ) -> Result<DocumentInsight, PortError>;

    /// Analyzes the supporting document set as a whole
    async fn analyze_document_set(
        &self,
        documents: &[Document],
    ) -> Result<DamageInsight, PortError>;
}
