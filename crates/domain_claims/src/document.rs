//! Documents attached to claims

use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DocumentId};

/// A document uploaded for a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,
    /// Claim the document belongs to
    pub claim: ClaimId,
    /// Original file name
    pub name: String,
    /// MIME content type as reported at upload
    pub content_type: String,
    /// Raw file bytes
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
}

impl Document {
    pub fn new(
        claim: ClaimId,
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            claim,
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Only image documents can be fed to the reasoning service
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_detection() {
        let claim = ClaimId::new();
        let png = Document::new(claim, "photo.png", "image/png", vec![0x89]);
        let pdf = Document::new(claim, "invoice.pdf", "application/pdf", vec![0x25]);
        assert!(png.is_image());
        assert!(!pdf.is_image());
    }
}
