//! Documents repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, DocumentId, DomainPort, PortError};
use domain_claims::{Document, DocumentsPort};

use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    claim: Uuid,
    name: String,
    content_type: String,
    data: Vec<u8>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: DocumentId::from(row.id),
            claim: ClaimId::from(row.claim),
            name: row.name,
            content_type: row.content_type,
            data: row.data,
        }
    }
}

/// Repository for claim documents, payload included
#[derive(Debug, Clone)]
pub struct DocumentsRepository {
    pool: PgPool,
}

impl DocumentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for DocumentsRepository {}

#[async_trait]
impl DocumentsPort for DocumentsRepository {
    async fn insert(&self, document: &Document) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, claim, name, content_type, data)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(document.claim.as_uuid())
        .bind(&document.name)
        .bind(&document.content_type)
        .bind(&document.data)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn get(&self, id: DocumentId) -> Result<Option<Document>, PortError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, claim, name, content_type, data FROM documents WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(Document::from))
    }

    async fn find_by_claim(&self, claim: ClaimId) -> Result<Vec<Document>, PortError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, claim, name, content_type, data FROM documents WHERE claim = $1 ORDER BY name",
        )
        .bind(claim.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }
}
