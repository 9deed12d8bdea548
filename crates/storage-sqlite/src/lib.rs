//! SQLite storage implementation for Event Cover.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `eventcover-core` and contains:
//! - Database connection pooling, migrations, and file backups
//! - A single writer actor that runs every write in an immediate transaction
//! - Repository implementations for quotes, policies, payments, logs, and backups
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

pub mod details;

// Repository implementations
pub mod backups;
pub mod logs;
pub mod payments;
pub mod policies;
pub mod quotes;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export database utilities
pub use db::{
    backup_database, create_pool, get_connection, init, run_migrations, spawn_writer,
    DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use backups::BackupRepository;
pub use logs::LogRepository;
pub use payments::PaymentRepository;
pub use policies::PolicyRepository;
pub use quotes::QuoteRepository;

// Re-export from eventcover-core for convenience
pub use eventcover_core::errors::{DatabaseError, Error, Result};
