//! SQLite storage implementation for database backups.

mod model;
mod repository;

pub use model::BackupDB;
pub use repository::BackupRepository;
