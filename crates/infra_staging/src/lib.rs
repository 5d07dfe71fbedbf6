//! Document Staging Infrastructure
//!
//! Holds freshly uploaded claim documents on local disk for a short retention
//! window so that operators and the analyzer can inspect the raw files, while
//! the durable copy lives in the database. A background housekeeper sweeps
//! the staging area and evicts files older than the retention window.
//!
//! The staging area is strictly a cache: losing it never loses claim data.

pub mod error;
pub mod store;

pub use error::StagingError;
pub use store::{run_housekeeper, StagedFile, StagedUpload, StagingStore};
