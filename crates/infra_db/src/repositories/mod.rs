//! Repository implementations of the claims domain ports

pub mod claims;
pub mod documents;
pub mod results;

pub use claims::ClaimsRepository;
pub use documents::DocumentsRepository;
pub use results::ResultsRepository;
