//! Database error types
//!
//! This module defines the error types that can occur during database
//! operations and the mapping onto the domain's [`PortError`].

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A row held a value the domain cannot represent
    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Maps SQLx errors to DatabaseError variants by PostgreSQL error code
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                    Some("23503") => {
                        DatabaseError::ForeignKeyViolation(db_err.message().to_string())
                    }
                    _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                }
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DatabaseError::Decode(format!("column {}: {}", index, source))
            }
            other => DatabaseError::QueryFailed(other.to_string()),
        }
    }
}

/// Adapters return [`PortError`] at the port boundary; persistence failures
/// surface as transient connection errors so callers retry, while decode
/// failures are permanent transformation errors.
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => PortError::NotFound {
                entity_type: "record".to_string(),
                id: message,
            },
            DatabaseError::Decode(message) => PortError::Transformation { message },
            DatabaseError::DuplicateEntry(message)
            | DatabaseError::ForeignKeyViolation(message) => PortError::Validation { message },
            other => PortError::Connection {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_port_not_found() {
        let error: PortError = DatabaseError::not_found("Claim", "CLM-1").into();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_query_failure_is_transient_at_the_port() {
        let error: PortError = DatabaseError::QueryFailed("connection reset".to_string()).into();
        assert!(error.is_transient());
    }

    #[test]
    fn test_decode_failure_is_permanent() {
        let error: PortError = DatabaseError::Decode("bad status".to_string()).into();
        assert!(!error.is_transient());
    }
}
