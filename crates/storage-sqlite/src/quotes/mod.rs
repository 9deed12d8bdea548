//! SQLite storage implementation for quotes and their owning users.

mod model;
mod repository;

pub use model::{QuoteChangesDB, QuoteDB, UserDB};
pub use repository::QuoteRepository;
pub(crate) use repository::write_quote;
