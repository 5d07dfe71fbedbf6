//! Claims repository implementation
//!
//! Claims are stored flat; the ids of their documents are aggregated from
//! the `documents` table on read, so the `documents` field of [`Claim`]
//! never goes stale.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, CustomerId, DocumentId, DomainPort, PortError};
use domain_claims::{Claim, ClaimsPort};

use crate::error::DatabaseError;

const SELECT_CLAIM: &str = r#"
    SELECT
        c.id, c.customer, c.date, c.claim_type, c.description, c.document,
        COALESCE(ARRAY_AGG(d.id) FILTER (WHERE d.id IS NOT NULL), '{}') AS documents,
        c.material, c.quantity, c.unit, c.amount, c.status,
        c.created_at, c.updated_at
    FROM claims c
    LEFT JOIN documents d ON d.claim = c.id
"#;

#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    id: Uuid,
    customer: Uuid,
    date: NaiveDate,
    claim_type: String,
    description: String,
    document: Option<Uuid>,
    documents: Vec<Uuid>,
    material: Option<i64>,
    quantity: Decimal,
    unit: String,
    amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(Claim {
            id: ClaimId::from(row.id),
            customer: CustomerId::from(row.customer),
            date: row.date,
            claim_type: row
                .claim_type
                .parse()
                .map_err(|e| DatabaseError::Decode(format!("claims.claim_type: {}", e)))?,
            description: row.description,
            document: row.document.map(DocumentId::from),
            documents: row.documents.into_iter().map(DocumentId::from).collect(),
            material: row.material,
            quantity: row.quantity,
            unit: row.unit,
            amount: row.amount,
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::Decode(format!("claims.status: {}", e)))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for claim records
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str) -> Result<Vec<Claim>, DatabaseError> {
        let query = format!("{SELECT_CLAIM} {clause} GROUP BY c.id ORDER BY c.created_at");
        let rows: Vec<ClaimRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        rows.into_iter().map(Claim::try_from).collect()
    }
}

impl DomainPort for ClaimsRepository {}

#[async_trait]
impl ClaimsPort for ClaimsRepository {
    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO claims
                (id, customer, date, claim_type, description, document,
                 material, quantity, unit, amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.customer.as_uuid())
        .bind(claim.date)
        .bind(claim.claim_type.as_str())
        .bind(&claim.description)
        .bind(claim.document.map(|d| *d.as_uuid()))
        .bind(claim.material)
        .bind(claim.quantity)
        .bind(&claim.unit)
        .bind(claim.amount)
        .bind(claim.status.as_str())
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        let query = format!("{SELECT_CLAIM} WHERE c.id = $1 GROUP BY c.id");
        let row: Option<ClaimRow> = sqlx::query_as(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        let row = row.ok_or_else(|| PortError::not_found("Claim", id))?;
        Ok(Claim::try_from(row)?)
    }

    async fn list(&self) -> Result<Vec<Claim>, PortError> {
        Ok(self.fetch_where("").await?)
    }

    async fn find_open(&self) -> Result<Vec<Claim>, PortError> {
        Ok(self.fetch_where("WHERE c.status = 'OPEN'").await?)
    }

    async fn save(&self, claim: &Claim) -> Result<(), PortError> {
        let outcome = sqlx::query(
            r#"
            UPDATE claims SET
                description = $2, document = $3, material = $4, quantity = $5,
                unit = $6, amount = $7, status = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(&claim.description)
        .bind(claim.document.map(|d| *d.as_uuid()))
        .bind(claim.material)
        .bind(claim.quantity)
        .bind(&claim.unit)
        .bind(claim.amount)
        .bind(claim.status.as_str())
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if outcome.rows_affected() == 0 {
            return Err(PortError::not_found("Claim", claim.id));
        }
        Ok(())
    }
}
