//! Data models
//!
//! This module contains all data structures used throughout Galleria.
//! Models represent:
//! - Database entities (User, Session, GalleryItem, GalleryCategory)
//! - Form input types and internal data transfer objects

mod gallery_category;
mod gallery_item;
mod session;
mod user;

pub use gallery_category::GalleryCategory;
pub use gallery_item::{CreateGalleryItemInput, GalleryItem, GalleryItemWithCategory};
pub use session::Session;
pub use user::User;
