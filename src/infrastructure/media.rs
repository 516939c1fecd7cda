//! Filesystem storage for uploaded cover images

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::domain::DomainError;

pub const MEDIA_URL: &str = "/media";
const COVERS_DIR: &str = "covers";

#[derive(Clone, Debug)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a cover under a fresh name and returns its media-relative path.
    pub async fn save_cover(&self, bytes: &[u8], extension: &str) -> Result<String, DomainError> {
        let dir = self.root.join(COVERS_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        let name = format!("{}/{}.{}", COVERS_DIR, Uuid::new_v4(), extension);
        tokio::fs::write(self.root.join(&name), bytes)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        tracing::debug!("Stored cover {}", name);
        Ok(name)
    }

    /// Deletes a stored file. Failures are logged, never returned.
    pub async fn remove(&self, name: &str) {
        if name.contains("..") {
            tracing::warn!("Refusing to remove media path {}", name);
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(name)).await {
            tracing::warn!("Could not remove media file {}: {}", name, e);
        }
    }

    pub fn url(&self, name: &str) -> String {
        format!("{}/{}", MEDIA_URL, name)
    }
}
