//! Business logic services
//!
//! Services sit between the HTTP layer and the repositories. Each
//! service owns the rules for one concern: authentication, gallery
//! content, password hashing, token derivation, and the external
//! media host.

pub mod auth;
pub mod cloudinary;
pub mod gallery;
pub mod password;
pub mod token;

pub use auth::{AuthError, AuthService, AuthSession};
pub use cloudinary::{CloudinaryClient, DeleteOutcome};
pub use gallery::{GalleryService, GalleryServiceError};
