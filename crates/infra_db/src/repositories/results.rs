//! Analysis results repository implementation
//!
//! The `results` table is keyed by claim id, which gives the one-result-per-
//! claim guarantee at the schema level. The analyzer checks `exists` before
//! dispatching, so a duplicate insert only ever signals a race and surfaces
//! as a validation error.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, DomainPort, PortError};
use domain_claims::{AnalysisResult, DamageAssessment, ResultsPort};

use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    claim: Uuid,
    status: String,
    reason: Option<String>,
    relevant: Option<bool>,
    summary: Option<String>,
    description: Option<String>,
    department: Option<String>,
    damage_factor: Option<f64>,
    damage_description: Option<String>,
}

impl TryFrom<ResultRow> for AnalysisResult {
    type Error = DatabaseError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let damage = match (row.damage_factor, row.damage_description) {
            (Some(factor), Some(description)) => Some(
                DamageAssessment::new(factor, description)
                    .map_err(|e| DatabaseError::Decode(format!("results.damage_factor: {}", e)))?,
            ),
            _ => None,
        };
        Ok(AnalysisResult {
            claim: ClaimId::from(row.claim),
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::Decode(format!("results.status: {}", e)))?,
            reason: row
                .reason
                .map(|r| r.parse())
                .transpose()
                .map_err(|e| DatabaseError::Decode(format!("results.reason: {}", e)))?,
            relevant: row.relevant,
            summary: row.summary,
            description: row.description,
            department: row.department,
            damage,
        })
    }
}

/// Repository for analysis results
#[derive(Debug, Clone)]
pub struct ResultsRepository {
    pool: PgPool,
}

impl ResultsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for ResultsRepository {}

#[async_trait]
impl ResultsPort for ResultsRepository {
    async fn insert(&self, result: &AnalysisResult) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO results
                (claim, status, reason, relevant, summary, description,
                 department, damage_factor, damage_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(result.claim.as_uuid())
        .bind(result.status.as_str())
        .bind(result.reason.map(|r| r.as_str()))
        .bind(result.relevant)
        .bind(&result.summary)
        .bind(&result.description)
        .bind(&result.department)
        .bind(result.damage.as_ref().map(|d| d.factor))
        .bind(result.damage.as_ref().map(|d| d.damage.clone()))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn get(&self, claim: ClaimId) -> Result<Option<AnalysisResult>, PortError> {
        let row: Option<ResultRow> = sqlx::query_as(
            r#"
            SELECT claim, status, reason, relevant, summary, description,
                   department, damage_factor, damage_description
            FROM results
            WHERE claim = $1
            "#,
        )
        .bind(claim.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(AnalysisResult::try_from).transpose()?)
    }

    async fn exists(&self, claim: ClaimId) -> Result<bool, PortError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT claim FROM results WHERE claim = $1")
            .bind(claim.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(found.is_some())
    }
}
