//! In-memory implementations of the persistence ports
//!
//! Backed by plain hash maps behind std mutexes; no lock is held across an
//! await point. These give the analyzer and handler tests read-your-writes
//! semantics without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{ClaimId, DocumentId, DomainPort, PortError};
use domain_claims::{
    AnalysisResult, Claim, ClaimStatus, ClaimsPort, Document, DocumentsPort, ResultsPort,
};

/// In-memory claims repository
#[derive(Default)]
pub struct InMemoryClaims {
    claims: Mutex<HashMap<ClaimId, Claim>>,
}

impl InMemoryClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a claim, bypassing the port
    pub fn seed(&self, claim: Claim) {
        self.claims.lock().expect("claims lock").insert(claim.id, claim);
    }
}

impl DomainPort for InMemoryClaims {}

#[async_trait]
impl ClaimsPort for InMemoryClaims {
    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        self.claims
            .lock()
            .expect("claims lock")
            .insert(claim.id, claim.clone());
        Ok(())
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.claims
            .lock()
            .expect("claims lock")
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn list(&self) -> Result<Vec<Claim>, PortError> {
        let mut claims: Vec<Claim> = self
            .claims
            .lock()
            .expect("claims lock")
            .values()
            .cloned()
            .collect();
        claims.sort_by_key(|c| c.created_at);
        Ok(claims)
    }

    async fn find_open(&self) -> Result<Vec<Claim>, PortError> {
        let mut open: Vec<Claim> = self
            .claims
            .lock()
            .expect("claims lock")
            .values()
            .filter(|c| c.status == ClaimStatus::Open)
            .cloned()
            .collect();
        open.sort_by_key(|c| c.created_at);
        Ok(open)
    }

    async fn save(&self, claim: &Claim) -> Result<(), PortError> {
        let mut claims = self.claims.lock().expect("claims lock");
        if !claims.contains_key(&claim.id) {
            return Err(PortError::not_found("Claim", claim.id));
        }
        claims.insert(claim.id, claim.clone());
        Ok(())
    }
}

/// In-memory documents repository
#[derive(Default)]
pub struct InMemoryDocuments {
    documents: Mutex<HashMap<DocumentId, Document>>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, document: Document) {
        self.documents
            .lock()
            .expect("documents lock")
            .insert(document.id, document);
    }
}

impl DomainPort for InMemoryDocuments {}

#[async_trait]
impl DocumentsPort for InMemoryDocuments {
    async fn insert(&self, document: &Document) -> Result<(), PortError> {
        self.documents
            .lock()
            .expect("documents lock")
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn get(&self, id: DocumentId) -> Result<Option<Document>, PortError> {
        Ok(self
            .documents
            .lock()
            .expect("documents lock")
            .get(&id)
            .cloned())
    }

    async fn find_by_claim(&self, claim: ClaimId) -> Result<Vec<Document>, PortError> {
        let mut documents: Vec<Document> = self
            .documents
            .lock()
            .expect("documents lock")
            .values()
            .filter(|d| d.claim == claim)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }
}

/// In-memory results repository
#[derive(Default)]
pub struct InMemoryResults {
    results: Mutex<HashMap<ClaimId, AnalysisResult>>,
}

impl InMemoryResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results written so far
    pub fn len(&self) -> usize {
        self.results.lock().expect("results lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainPort for InMemoryResults {}

#[async_trait]
impl ResultsPort for InMemoryResults {
    async fn insert(&self, result: &AnalysisResult) -> Result<(), PortError> {
        let mut results = self.results.lock().expect("results lock");
        if results.contains_key(&result.claim) {
            return Err(PortError::validation(format!(
                "result for claim {} already exists",
                result.claim
            )));
        }
        results.insert(result.claim, result.clone());
        Ok(())
    }

    async fn get(&self, claim: ClaimId) -> Result<Option<AnalysisResult>, PortError> {
        Ok(self
            .results
            .lock()
            .expect("results lock")
            .get(&claim)
            .cloned())
    }

    async fn exists(&self, claim: ClaimId) -> Result<bool, PortError> {
        Ok(self
            .results
            .lock()
            .expect("results lock")
            .contains_key(&claim))
    }
}
