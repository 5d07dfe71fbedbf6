//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, CustomerId, DocumentId};
use domain_claims::{Claim, ClaimStatus, ClaimType, Document, NewClaim};

/// Builder for constructing test claims
pub struct ClaimBuilder {
    customer: CustomerId,
    date: NaiveDate,
    claim_type: ClaimType,
    description: String,
    document: Option<DocumentId>,
    quantity: Decimal,
    unit: String,
    amount: Decimal,
    status: ClaimStatus,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            customer: CustomerId::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid test date"),
            claim_type: ClaimType::Return,
            description: "Blender stopped working after two days".to_string(),
            document: None,
            quantity: dec!(1),
            unit: "EA".to_string(),
            amount: dec!(89.00),
            status: ClaimStatus::Pending,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, customer: CustomerId) -> Self {
        self.customer = customer;
        self
    }

    /// Sets the claim type
    pub fn with_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Links the primary document
    pub fn with_document(mut self, document: DocumentId) -> Self {
        self.document = Some(document);
        self
    }

    /// Sets the claimed amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the status the built claim should end up in
    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        let mut claim = Claim::submit(NewClaim {
            customer: self.customer,
            date: self.date,
            claim_type: self.claim_type,
            description: self.description,
            document: self.document,
            quantity: self.quantity,
            unit: self.unit,
            amount: self.amount,
        });
        // walk the lifecycle to the requested status
        match self.status {
            ClaimStatus::Pending => {}
            ClaimStatus::Open => {
                claim.update_status(ClaimStatus::Open).expect("valid path");
            }
            ClaimStatus::InProgress => {
                claim.update_status(ClaimStatus::Open).expect("valid path");
                claim
                    .update_status(ClaimStatus::InProgress)
                    .expect("valid path");
            }
            ClaimStatus::Closed => {
                claim.update_status(ClaimStatus::Open).expect("valid path");
                claim.update_status(ClaimStatus::Closed).expect("valid path");
            }
        }
        claim
    }
}

/// Builder for constructing test documents
pub struct DocumentBuilder {
    claim: ClaimId,
    name: String,
    content_type: String,
    data: Vec<u8>,
}

impl DocumentBuilder {
    /// Creates a new builder for the given claim
    pub fn for_claim(claim: ClaimId) -> Self {
        Self {
            claim,
            name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    /// Sets the file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the payload
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Builds the document
    pub fn build(self) -> Document {
        Document::new(self.claim, self.name, self.content_type, self.data)
    }
}
