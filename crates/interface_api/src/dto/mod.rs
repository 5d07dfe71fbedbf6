//! Request and response data transfer objects

pub mod claims;
pub mod documents;
