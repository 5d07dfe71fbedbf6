//! Documents DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::DocumentId;

/// Metadata of one uploaded document; the payload is never echoed back
#[derive(Debug, Serialize)]
pub struct DocumentMetaResponse {
    pub id: DocumentId,
    pub content_type: String,
    pub staged_at: DateTime<Utc>,
}
