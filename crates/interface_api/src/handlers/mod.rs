//! Request handlers

pub mod claims;
pub mod documents;
pub mod health;
