//! Documents module - rendering and storage of policy documents.

mod documents_traits;

pub use documents_traits::{DocumentStore, PolicyDocumentRenderer};
