//! Core Kernel - Foundational types and utilities for the claims triage system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers and value objects
//! - Port infrastructure for the hexagonal architecture
//! - The task supervisor that owns every long-lived background operation

pub mod identifiers;
pub mod ports;
pub mod tasks;

pub use identifiers::{ClaimId, CustomerId, DocumentId};
pub use ports::{DomainPort, PortError};
pub use tasks::{ManagedTask, SupervisorError, TaskFailure, TaskSupervisor};
