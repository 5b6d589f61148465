//! # catalog-core
//!
//! Core types, traits, and abstractions for the product catalogue.
//!
//! This crate provides the domain models (categories, brands, collections,
//! attributes, products and their images), the category hierarchy walk, and
//! the repository traits that the persistence and HTTP crates build on.

pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod models;
pub mod slug;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use hierarchy::{
    breadcrumb, would_create_cycle, Breadcrumb, BreadcrumbEntry, CategoryTree, ParentLookup,
    BREADCRUMB_SEPARATOR, MAX_CATEGORY_DEPTH,
};
pub use models::*;
pub use slug::{is_valid_slug, slugify};
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
