//! Create Vote Use Case

use chrono::{DateTime, SubsecRound, Utc};
use kernel::id::UserId;
use std::sync::Arc;

use crate::application::config::VoteConfig;
use crate::domain::entities::Vote;
use crate::domain::repository::VoteRepository;
use crate::domain::services::{VoteDraft, validate_draft};
use crate::domain::storage::ImageStorage;
use crate::domain::value_objects::ImageUpload;
use crate::error::VoteResult;

pub struct CreateVoteUseCase<R, S>
where
    R: VoteRepository,
    S: ImageStorage,
{
    vote_repo: Arc<R>,
    storage: Arc<S>,
    config: Arc<VoteConfig>,
}

impl<R, S> CreateVoteUseCase<R, S>
where
    R: VoteRepository,
    S: ImageStorage,
{
    pub fn new(vote_repo: Arc<R>, storage: Arc<S>, config: Arc<VoteConfig>) -> Self {
        Self {
            vote_repo,
            storage,
            config,
        }
    }

    pub async fn execute(
        &self,
        writer_id: UserId,
        draft: VoteDraft,
        images: Vec<ImageUpload>,
    ) -> VoteResult<Vote> {
        self.execute_at(writer_id, draft, images, Utc::now()).await
    }

    /// Validate everything, upload images in order, then insert in one unit.
    pub async fn execute_at(
        &self,
        writer_id: UserId,
        draft: VoteDraft,
        images: Vec<ImageUpload>,
        now: DateTime<Utc>,
    ) -> VoteResult<Vote> {
        // Stored timestamps keep microseconds
        let now = now.trunc_subsecs(6);
        let mut new_vote = validate_draft(draft, writer_id, now, self.config.civil_offset())?;

        let extensions = images
            .iter()
            .map(|image| image.checked_extension(&self.config.allowed_image_extensions))
            .collect::<VoteResult<Vec<_>>>()?;

        for (image, extension) in images.iter().zip(extensions) {
            let key = format!("{}.{}", uuid::Uuid::new_v4(), extension);
            let url = self.storage.put(&key, &image.bytes).await?;
            new_vote.image_urls.push(url);
        }

        let vote = self.vote_repo.create(new_vote).await?;

        tracing::info!(
            vote_id = %vote.id,
            writer_id = %writer_id,
            images = images.len(),
            "Vote created"
        );

        Ok(vote)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::services::tests::draft;
    use crate::error::VoteError;
    use crate::infra::memory::InMemoryVoteRepository;
    use std::sync::Mutex;

    /// Records keys instead of writing files
    #[derive(Default)]
    pub(crate) struct RecordingStorage {
        pub(crate) keys: Mutex<Vec<String>>,
    }

    impl ImageStorage for RecordingStorage {
        async fn put(&self, key: &str, _bytes: &[u8]) -> VoteResult<String> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("/images/{key}"))
        }
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_create_with_choices_and_images_in_order() {
        let repo = Arc::new(InMemoryVoteRepository::new());
        let storage = Arc::new(RecordingStorage::default());
        let use_case =
            CreateVoteUseCase::new(repo.clone(), storage.clone(), Arc::new(VoteConfig::default()));

        let vote = use_case
            .execute(
                UserId::from_i64(1),
                draft(),
                vec![image("first.png"), image("second.JPG")],
            )
            .await
            .unwrap();

        let choices = repo.find_choices(vote.id).await.unwrap();
        assert_eq!(
            choices.iter().map(|c| c.content.as_str()).collect::<Vec<_>>(),
            vec!["학식", "짜장면"]
        );

        let images = repo.find_images(vote.id).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].order, 1);
        assert!(images[0].src.ends_with(".png"));
        assert_eq!(images[1].order, 2);
        assert!(images[1].src.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_bad_extension_uploads_nothing() {
        let repo = Arc::new(InMemoryVoteRepository::new());
        let storage = Arc::new(RecordingStorage::default());
        let use_case =
            CreateVoteUseCase::new(repo.clone(), storage.clone(), Arc::new(VoteConfig::default()));

        let err = use_case
            .execute(
                UserId::from_i64(1),
                draft(),
                vec![image("ok.png"), image("script.exe")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, VoteError::InvalidFileExtension(_)));
        assert!(storage.keys.lock().unwrap().is_empty());
        assert_eq!(repo.find_by_id(kernel::id::VoteId::from_i64(1)).await.unwrap(), None);
    }
}
