//! Database Infrastructure Layer
//!
//! PostgreSQL adapters for the claims domain ports, built on SQLx with
//! runtime-checked queries. This crate owns pool configuration, schema
//! migrations, and the repository implementations of `ClaimsPort`,
//! `DocumentsPort`, and `ResultsPort`.
//!
//! Statuses are stored as TEXT in their wire form (`OPEN`, `IN_PROGRESS`,
//! ...), document payloads as BYTEA, and monetary amounts as NUMERIC.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{ClaimsRepository, DocumentsRepository, ResultsRepository};
