//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the persistence of a specific entity.

pub mod gallery_category;
pub mod gallery_item;
pub mod session;
pub mod user;

pub use gallery_category::{GalleryCategoryRepository, SqlxGalleryCategoryRepository};
pub use gallery_item::{GalleryItemRepository, SqlxGalleryItemRepository};
pub use session::{SessionConflict, SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
