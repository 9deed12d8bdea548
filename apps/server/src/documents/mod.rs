//! Policy document rendering and on-disk storage.

mod pdf;
mod store;

pub use pdf::TextPdfRenderer;
pub use store::FileDocumentStore;
