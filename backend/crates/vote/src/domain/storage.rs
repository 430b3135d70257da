//! Object storage collaborator for vote images

use crate::error::VoteResult;

#[trait_variant::make(ImageStorage: Send)]
pub trait LocalImageStorage {
    /// Store `bytes` under `key` and return the URL it is served from.
    async fn put(&self, key: &str, bytes: &[u8]) -> VoteResult<String>;
}
