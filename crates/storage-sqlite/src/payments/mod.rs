//! SQLite storage implementation for payments.

mod model;
mod repository;

pub use model::PaymentDB;
pub use repository::PaymentRepository;
pub(crate) use repository::insert_payment;
