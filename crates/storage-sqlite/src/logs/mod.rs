//! SQLite storage implementation for the event and error logs.

mod model;
mod repository;

pub use model::{ErrorLogDB, EventLogDB};
pub use repository::LogRepository;
