//! Traits for rendering policy documents and storing them durably.

use async_trait::async_trait;

use crate::errors::Result;
use crate::policies::PolicySnapshot;

/// Renders a policy snapshot to PDF bytes.
pub trait PolicyDocumentRenderer: Send + Sync {
    fn render(&self, snapshot: &PolicySnapshot) -> Result<Vec<u8>>;
}

/// Durable storage for rendered documents, addressed by file name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn write(&self, file_name: &str, bytes: Vec<u8>) -> Result<()>;

    async fn read(&self, file_name: &str) -> Result<Vec<u8>>;

    /// Removes a document. Returns false when it did not exist.
    async fn delete(&self, file_name: &str) -> Result<bool>;

    async fn exists(&self, file_name: &str) -> Result<bool>;
}
