//! Gallery item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GalleryCategory;

/// A single photo in the gallery.
///
/// The image itself lives on an external media host; only its delivery
/// URL is stored here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryItem {
    /// Unique identifier
    pub id: i64,
    /// Display title
    pub title: String,
    /// Optional description shown under the image
    pub description: Option<String>,
    /// Externally hosted image URL
    pub image_url: String,
    /// Owning category, if any
    pub category_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Gallery item joined with its category for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItemWithCategory {
    /// The item itself
    #[serde(flatten)]
    pub item: GalleryItem,
    /// The owning category, resolved from `category_id`
    pub category: Option<GalleryCategory>,
}

/// Input for creating a new gallery item
#[derive(Debug, Clone)]
pub struct CreateGalleryItemInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub category_id: Option<i64>,
}
