//! Claim Triage Engine
//!
//! The background half of the system: a polling loop that discovers `OPEN`
//! claims, guarantees at most one in-flight analysis per claim, fans out to
//! the external multimodal reasoning service, and persists exactly one
//! analysis result per claim. Runs as a managed task under the process
//! supervisor and shuts down cooperatively.

pub mod analyzer;
pub mod reasoning;

pub use analyzer::ClaimAnalyzer;
pub use reasoning::{ReasoningClient, ReasoningConfig, ReasoningError};
