//! Gallery item repository
//!
//! The listing queries left-join the owning category so pages render
//! from a single result set.

use crate::db::DbPool;
use crate::models::{CreateGalleryItemInput, GalleryCategory, GalleryItem, GalleryItemWithCategory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Gallery item repository trait
#[async_trait]
pub trait GalleryItemRepository: Send + Sync {
    /// Create a new gallery item, returning it with its assigned id
    async fn create(&self, input: &CreateGalleryItemInput) -> Result<GalleryItem>;

    /// Get item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryItem>>;

    /// List items with their categories, newest first, optionally limited
    async fn list_with_categories(&self, limit: Option<i64>)
        -> Result<Vec<GalleryItemWithCategory>>;

    /// Delete an item, returning whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based gallery item repository implementation
pub struct SqlxGalleryItemRepository {
    pool: DbPool,
}

impl SqlxGalleryItemRepository {
    /// Create a new SQLx gallery item repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn GalleryItemRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl GalleryItemRepository for SqlxGalleryItemRepository {
    async fn create(&self, input: &CreateGalleryItemInput) -> Result<GalleryItem> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO gallery_items (title, description, image_url, category_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.category_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery item")?;

        Ok(GalleryItem {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            category_id: input.category_id,
            created_at,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryItem>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, image_url, category_id, created_at
            FROM gallery_items
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get gallery item by ID")?;

        Ok(row.map(|row| row_to_item(&row)))
    }

    async fn list_with_categories(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<GalleryItemWithCategory>> {
        let base = r#"
            SELECT
                i.id, i.title, i.description, i.image_url, i.category_id, i.created_at,
                c.id AS c_id, c.name AS c_name, c.created_at AS c_created_at
            FROM gallery_items i
            LEFT JOIN gallery_categories c ON c.id = i.category_id
            ORDER BY i.id DESC
        "#;

        let rows = match limit {
            Some(limit) => {
                sqlx::query(&format!("{} LIMIT ?", base))
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => sqlx::query(base).fetch_all(&self.pool).await,
        }
        .context("Failed to list gallery items")?;

        Ok(rows
            .iter()
            .map(|row| {
                let item = row_to_item(row);
                let category = row
                    .get::<Option<i64>, _>("c_id")
                    .map(|id| GalleryCategory {
                        id,
                        name: row.get("c_name"),
                        created_at: row.get("c_created_at"),
                    });
                GalleryItemWithCategory { item, category }
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery item")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> GalleryItem {
    GalleryItem {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        category_id: row.get("category_id"),
        created_at: row.get("created_at"),
    }
}
