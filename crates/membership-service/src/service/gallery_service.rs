//! 相册服务
//!
//! 相册图片直接存放在公开存储桶中，这里只负责列举并生成公开链接

use std::sync::Arc;

use gym_shared::storage::ObjectStorage;
use tracing::instrument;

use crate::error::Result;
use crate::service::dto::GalleryImage;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

fn is_image(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// 相册服务
pub struct GalleryService {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
}

impl GalleryService {
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_images(&self) -> Result<Vec<GalleryImage>> {
        let objects = self.storage.list(&self.bucket, "").await?;

        Ok(objects
            .into_iter()
            .filter(|o| is_image(&o.name))
            .map(|o| GalleryImage {
                url: self.storage.public_url(&self.bucket, &o.name),
                name: o.name,
                size: o.size,
                updated_at: o.updated_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryStorage;

    #[test]
    fn test_is_image() {
        assert!(is_image("pool.JPG"));
        assert!(is_image("a.b.webp"));
        assert!(!is_image("notes.txt"));
        assert!(!is_image("no_extension"));
    }

    #[tokio::test]
    async fn test_list_images_filters_non_images() {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .upload("gallery", "floor.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        storage
            .upload("gallery", "readme.txt", vec![1], "text/plain")
            .await
            .unwrap();
        storage
            .upload("receipts", "other.png", vec![1], "image/png")
            .await
            .unwrap();

        let service = GalleryService::new(storage, "gallery");
        let images = service.list_images().await.unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "floor.png");
        assert_eq!(images[0].size, Some(3));
        assert!(images[0].url.contains("gallery/floor.png"));
    }
}
