//! Gallery category repository

use crate::db::DbPool;
use crate::models::GalleryCategory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// Gallery category repository trait
#[async_trait]
pub trait GalleryCategoryRepository: Send + Sync {
    /// Create a new category, returning it with its assigned id
    async fn create(&self, category: &GalleryCategory) -> Result<GalleryCategory>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryCategory>>;

    /// List all categories in ascending name order
    async fn list(&self) -> Result<Vec<GalleryCategory>>;

    /// Delete a category, returning whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based gallery category repository implementation
pub struct SqlxGalleryCategoryRepository {
    pool: DbPool,
}

impl SqlxGalleryCategoryRepository {
    /// Create a new SQLx gallery category repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn GalleryCategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl GalleryCategoryRepository for SqlxGalleryCategoryRepository {
    async fn create(&self, category: &GalleryCategory) -> Result<GalleryCategory> {
        let result = sqlx::query(
            "INSERT INTO gallery_categories (name, created_at) VALUES (?, ?)",
        )
        .bind(&category.name)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery category")?;

        let mut created = category.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryCategory>> {
        let row = sqlx::query(
            "SELECT id, name, created_at FROM gallery_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get gallery category by ID")?;

        Ok(row.map(|row| row_to_category(&row)))
    }

    async fn list(&self) -> Result<Vec<GalleryCategory>> {
        let rows = sqlx::query(
            "SELECT id, name, created_at FROM gallery_categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list gallery categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery category")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> GalleryCategory {
    GalleryCategory {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}
