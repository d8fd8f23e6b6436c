//! Gallery service
//!
//! Content operations for gallery items and categories, including the
//! two-step item deletion: remove the database row first, then attempt
//! remote image cleanup without letting its outcome affect the result.

use std::sync::Arc;

use thiserror::Error;

use crate::db::repositories::{GalleryCategoryRepository, GalleryItemRepository};
use crate::models::{CreateGalleryItemInput, GalleryCategory, GalleryItem, GalleryItemWithCategory};
use crate::services::cloudinary::{CloudinaryClient, DeleteOutcome};

#[derive(Debug, Error)]
pub enum GalleryServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("A category with that name already exists")]
    CategoryExists,
    #[error("Not found")]
    NotFound,
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct GalleryService {
    item_repo: Arc<dyn GalleryItemRepository>,
    category_repo: Arc<dyn GalleryCategoryRepository>,
    cloudinary: CloudinaryClient,
}

impl GalleryService {
    pub fn new(
        item_repo: Arc<dyn GalleryItemRepository>,
        category_repo: Arc<dyn GalleryCategoryRepository>,
        cloudinary: CloudinaryClient,
    ) -> Self {
        Self {
            item_repo,
            category_repo,
            cloudinary,
        }
    }

    /// Newest items first, capped for the home page.
    pub async fn list_recent(
        &self,
        limit: i64,
    ) -> Result<Vec<GalleryItemWithCategory>, GalleryServiceError> {
        Ok(self.item_repo.list_with_categories(Some(limit)).await?)
    }

    pub async fn list_items(&self) -> Result<Vec<GalleryItemWithCategory>, GalleryServiceError> {
        Ok(self.item_repo.list_with_categories(None).await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<GalleryCategory>, GalleryServiceError> {
        Ok(self.category_repo.list().await?)
    }

    pub async fn create_item(
        &self,
        input: CreateGalleryItemInput,
    ) -> Result<GalleryItem, GalleryServiceError> {
        if input.title.trim().is_empty() {
            return Err(GalleryServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.image_url.trim().is_empty() {
            return Err(GalleryServiceError::ValidationError(
                "Image URL cannot be empty".to_string(),
            ));
        }

        Ok(self.item_repo.create(&input).await?)
    }

    /// Delete an item. The row is removed first; remote image cleanup
    /// follows and its outcome is only logged.
    pub async fn delete_item(&self, id: i64) -> Result<(), GalleryServiceError> {
        let item = self
            .item_repo
            .get_by_id(id)
            .await?
            .ok_or(GalleryServiceError::NotFound)?;

        if !self.item_repo.delete(id).await? {
            return Err(GalleryServiceError::NotFound);
        }

        match self.cloudinary.delete_image(&item.image_url).await {
            DeleteOutcome::Deleted => {
                tracing::info!(item_id = id, "Deleted remote image");
            }
            DeleteOutcome::NotFound => {
                tracing::warn!(item_id = id, "Remote image already gone");
            }
            DeleteOutcome::Failed(reason) => {
                tracing::error!(item_id = id, %reason, "Failed to delete remote image");
            }
        }

        Ok(())
    }

    pub async fn create_category(
        &self,
        name: &str,
    ) -> Result<GalleryCategory, GalleryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GalleryServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        match self
            .category_repo
            .create(&GalleryCategory::new(name.to_string()))
            .await
        {
            Ok(category) => Ok(category),
            Err(e) => {
                let is_unique = e
                    .downcast_ref::<sqlx::Error>()
                    .and_then(|e| e.as_database_error())
                    .is_some_and(|db| db.is_unique_violation());
                if is_unique {
                    Err(GalleryServiceError::CategoryExists)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), GalleryServiceError> {
        if self.category_repo.delete(id).await? {
            Ok(())
        } else {
            Err(GalleryServiceError::NotFound)
        }
    }
}
