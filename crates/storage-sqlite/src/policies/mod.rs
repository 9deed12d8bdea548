//! SQLite storage implementation for policies and their versions.

mod model;
mod repository;

pub use model::{PolicyDB, PolicyVersionDB};
pub use repository::PolicyRepository;
