//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the claims triage test suite.
//!
//! # Modules
//!
//! - `builders`: Builder patterns for test data construction
//! - `memory`: In-memory implementations of the persistence ports
//! - `reasoning`: A scriptable stand-in for the reasoning service

pub mod builders;
pub mod memory;
pub mod reasoning;

pub use builders::*;
pub use memory::*;
pub use reasoning::*;
