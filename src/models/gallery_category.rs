//! Gallery category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category used to group gallery items.
///
/// Categories are flat (no hierarchy) and listed alphabetically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryCategory {
    /// Unique identifier
    pub id: i64,
    /// Category name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl GalleryCategory {
    /// Create a new category with the given name.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String) -> Self {
        Self {
            id: 0,
            name,
            created_at: Utc::now(),
        }
    }
}
