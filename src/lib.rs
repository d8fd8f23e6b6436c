//! Galleria - a lightweight server-rendered photo gallery CMS
//!
//! Visitors browse the gallery anonymously; administrators sign in with
//! a session cookie to manage items and categories. Sessions use opaque
//! bearer tokens with sliding renewal, images live on Cloudinary, and
//! everything persists to a single SQLite file.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod view;
