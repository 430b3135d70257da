//! Filesystem image storage
//!
//! Writes uploads into a local directory that the API binary serves
//! under a static path.

use std::path::PathBuf;

use crate::domain::storage::ImageStorage;
use crate::error::{VoteError, VoteResult};

#[derive(Debug, Clone)]
pub struct FsImageStorage {
    dir: PathBuf,
    base_url: String,
}

impl FsImageStorage {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl ImageStorage for FsImageStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> VoteResult<String> {
        // Keys are generated server side, never from client file names
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(VoteError::Storage(format!("rejected object key {key}")));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| VoteError::Storage(e.to_string()))?;
        tokio::fs::write(self.dir.join(key), bytes)
            .await
            .map_err(|e| VoteError::Storage(e.to_string()))?;

        tracing::debug!(key = %key, size = bytes.len(), "Stored vote image");
        Ok(format!("{}/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("vote-images-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = scratch_dir();
        let storage = FsImageStorage::new(&dir, "/images/");

        let url = storage.put("a.png", b"PNG").await.unwrap();

        assert_eq!(url, "/images/a.png");
        assert_eq!(tokio::fs::read(dir.join("a.png")).await.unwrap(), b"PNG");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_rejects_path_segments() {
        let storage = FsImageStorage::new(scratch_dir(), "/images");

        assert!(matches!(
            storage.put("../escape.png", b"x").await,
            Err(VoteError::Storage(_))
        ));
    }
}
