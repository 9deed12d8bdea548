//! Event Cover Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for Event Cover: the premium
//! rate tables, the quote lifecycle, quote-to-policy conversion, policy
//! versioning, payments, and maintenance jobs. It is database-agnostic and
//! defines traits that are implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod details;
pub mod documents;
pub mod errors;
pub mod events;
pub mod logs;
pub mod maintenance;
pub mod notifications;
pub mod payments;
pub mod policies;
pub mod premiums;
pub mod quotes;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

#[cfg(test)]
pub(crate) mod test_support;
