use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eventcover_core::{documents::DocumentStore, errors::Error, Result};
use tokio::fs;

/// Stores documents as files in a single directory.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    /// Creates the store, creating `root` if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a document name inside the root, rejecting anything that
    /// could escape it.
    fn path_for(&self, file_name: &str) -> Result<PathBuf> {
        let valid = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\', '\0']);
        if !valid {
            return Err(Error::Document(format!(
                "Invalid document name '{}'",
                file_name
            )));
        }
        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn write(&self, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(file_name)?;
        fs::write(&path, bytes).await?;
        tracing::debug!("Stored document {}", path.display());
        Ok(())
    }

    async fn read(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(file_name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Document {}", file_name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, file_name: &str) -> Result<bool> {
        let path = self.path_for(file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, file_name: &str) -> Result<bool> {
        let path = self.path_for(file_name)?;
        Ok(fs::try_exists(&path).await?)
    }
}
