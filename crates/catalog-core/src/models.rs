//! Core data models for the catalogue.
//!
//! These types are shared across all catalogue crates and represent the
//! domain entities: the category tree, brands, curated collections, attribute
//! types, products, and the images and attribute values attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::hierarchy::Breadcrumb;
use crate::slug::{is_valid_slug, slugify};

/// Maximum length of names, slugs, alt texts and captions.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of an attribute type name.
pub const MAX_ATTRIBUTE_NAME_LENGTH: usize = 100;

/// Maximum length of a product SKU.
pub const MAX_SKU_LENGTH: usize = 100;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

fn validate_required(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn validate_optional(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Use the explicit slug when given, otherwise derive one from the name.
fn resolve_slug(slug: Option<&str>, name: &str) -> Result<String> {
    let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => slugify(name),
    };
    if !is_valid_slug(&slug) {
        return Err(Error::InvalidInput(format!(
            "invalid slug '{}': use lowercase letters, digits, '-' or '_'",
            slug
        )));
    }
    Ok(slug)
}

// =============================================================================
// CATEGORY TYPES
// =============================================================================

/// A product category. Categories nest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Parent category ID (None = root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Request to create or replace a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Prepopulated from `name` when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Categories are updated by full replacement.
pub type UpdateCategoryRequest = CreateCategoryRequest;

impl CreateCategoryRequest {
    /// Validate fields and return the slug to store.
    pub fn validate(&self) -> Result<String> {
        validate_required("name", &self.name, MAX_NAME_LENGTH)?;
        resolve_slug(self.slug.as_deref(), &self.name)
    }
}

// =============================================================================
// BRAND TYPES
// =============================================================================

/// A product brand or manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    /// Stored path of the brand logo image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub description: String,
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Request to create or replace a brand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub description: String,
}

pub type UpdateBrandRequest = CreateBrandRequest;

impl CreateBrandRequest {
    pub fn validate(&self) -> Result<()> {
        validate_required("name", &self.name, MAX_NAME_LENGTH)?;
        let url = self.website_url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!(
                "website_url must start with http:// or https://, got '{}'",
                url
            )));
        }
        Ok(())
    }
}

// =============================================================================
// COLLECTION TYPES
// =============================================================================

/// A curated collection of products (e.g. "Summer Collection").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

pub type UpdateCollectionRequest = CreateCollectionRequest;

impl CreateCollectionRequest {
    /// Validate fields and return the slug to store.
    pub fn validate(&self) -> Result<String> {
        validate_required("name", &self.name, MAX_NAME_LENGTH)?;
        resolve_slug(self.slug.as_deref(), &self.name)
    }
}

// =============================================================================
// ATTRIBUTE TYPES
// =============================================================================

/// A kind of product attribute (e.g. "Color", "Size", "Material").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Uuid,
    pub name: String,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAttributeRequest {
    pub name: String,
}

impl CreateAttributeRequest {
    pub fn validate(&self) -> Result<()> {
        validate_required("name", &self.name, MAX_ATTRIBUTE_NAME_LENGTH)
    }
}

/// A concrete attribute value shared by any number of products
/// (e.g. Attribute "Color", value "Red").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub id: Uuid,
    pub attribute_id: Uuid,
    pub attribute_name: String,
    pub value: String,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

impl fmt::Display for ProductAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.attribute_name, self.value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductAttributeRequest {
    pub attribute_id: Uuid,
    pub value: String,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

impl CreateProductAttributeRequest {
    pub fn validate(&self) -> Result<()> {
        validate_required("value", &self.value, MAX_NAME_LENGTH)
    }
}

// =============================================================================
// PRODUCT TYPES
// =============================================================================

/// The main product entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub is_published: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub category_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub collection_ids: Vec<Uuid>,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Request to create or replace a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub is_published: bool,
    pub category_id: Uuid,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub collection_ids: Vec<Uuid>,
}

pub type UpdateProductRequest = CreateProductRequest;

impl CreateProductRequest {
    /// Validate fields and return the slug to store.
    pub fn validate(&self) -> Result<String> {
        validate_required("name", &self.name, MAX_NAME_LENGTH)?;
        validate_required("sku", &self.sku, MAX_SKU_LENGTH)?;
        resolve_slug(self.slug.as_deref(), &self.name)
    }
}

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Stored path of the image file.
    pub image: String,
    pub alt_text: String,
    #[serde(default)]
    pub caption: String,
    /// Display position; 0 comes first.
    pub display_order: i32,
}

impl ProductImage {
    /// Human-readable label, e.g. "Linen Shirt - Image 2".
    pub fn label(&self, product_name: &str) -> String {
        format!("{} - Image {}", product_name, self.display_order)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductImageRequest {
    pub image: String,
    pub alt_text: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub display_order: i32,
}

impl CreateProductImageRequest {
    pub fn validate(&self) -> Result<()> {
        validate_required("image", &self.image, MAX_NAME_LENGTH)?;
        validate_required("alt_text", &self.alt_text, MAX_NAME_LENGTH)?;
        validate_optional("caption", &self.caption, MAX_NAME_LENGTH)?;
        if self.display_order < 0 {
            return Err(Error::InvalidInput(
                "display_order must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything a product detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub breadcrumb: Breadcrumb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
    pub collections: Vec<Collection>,
    pub images: Vec<ProductImage>,
    pub attributes: Vec<ProductAttribute>,
}

/// A category page: the category, where it sits, what is below it.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub breadcrumb: Breadcrumb,
    pub children: Vec<Category>,
    pub products: Vec<Product>,
}

// =============================================================================
// USER TYPES
// =============================================================================

/// An account allowed to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Staff users may use the administrative API.
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<()> {
        validate_required("username", &self.username, 150)?;
        validate_password(&self.password)
    }
}

/// Login form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Password change form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<()> {
        if self.new_password1 != self.new_password2 {
            return Err(Error::InvalidInput(
                "The two password fields didn't match".to_string(),
            ));
        }
        validate_password(&self.new_password1)
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// A signed-in session resolved from its token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_slug_prepopulated_from_name() {
        let req = CreateCategoryRequest {
            name: "Ropa de Niño".to_string(),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap(), "ropa-de-nino");
    }

    #[test]
    fn test_category_explicit_slug_kept() {
        let req = CreateCategoryRequest {
            name: "Shoes".to_string(),
            slug: Some("footwear".to_string()),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap(), "footwear");
    }

    #[test]
    fn test_category_invalid_slug_rejected() {
        let req = CreateCategoryRequest {
            name: "Shoes".to_string(),
            slug: Some("Foot Wear".to_string()),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let req = CreateCollectionRequest {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_name_without_slug_characters_rejected() {
        let req = CreateCollectionRequest {
            name: "???".to_string(),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_attribute_name_length_limit() {
        let req = CreateAttributeRequest {
            name: "x".repeat(MAX_ATTRIBUTE_NAME_LENGTH + 1),
        };
        assert!(req.validate().is_err());
        let req = CreateAttributeRequest {
            name: "Color".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_brand_website_url_scheme() {
        let mut req = CreateBrandRequest {
            name: "Acme".to_string(),
            website_url: "acme.example".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        req.website_url = "https://acme.example".to_string();
        assert!(req.validate().is_ok());
        req.website_url = String::new();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_product_requires_sku() {
        let req = CreateProductRequest {
            name: "Linen Shirt".to_string(),
            sku: String::new(),
            category_id: Uuid::nil(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_product_defaults_unpublished() {
        let req: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "Linen Shirt",
            "sku": "LS-001",
            "category_id": Uuid::nil(),
        }))
        .unwrap();
        assert!(!req.is_published);
        assert_eq!(req.validate().unwrap(), "linen-shirt");
    }

    #[test]
    fn test_image_negative_order_rejected() {
        let req = CreateProductImageRequest {
            image: "product/a.jpg".to_string(),
            alt_text: "Front view".to_string(),
            display_order: -1,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_image_label() {
        let image = ProductImage {
            id: Uuid::nil(),
            product_id: Uuid::nil(),
            image: "product/a.jpg".to_string(),
            alt_text: "Front".to_string(),
            caption: String::new(),
            display_order: 2,
        };
        assert_eq!(image.label("Linen Shirt"), "Linen Shirt - Image 2");
    }

    #[test]
    fn test_product_attribute_display() {
        let value = ProductAttribute {
            id: Uuid::nil(),
            attribute_id: Uuid::nil(),
            attribute_name: "Color".to_string(),
            value: "Red".to_string(),
            product_ids: vec![],
        };
        assert_eq!(value.to_string(), "Color - Red");
    }

    #[test]
    fn test_change_password_mismatch() {
        let req = ChangePasswordRequest {
            old_password: "old-password".to_string(),
            new_password1: "new-password-1".to_string(),
            new_password2: "new-password-2".to_string(),
        };
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_change_password_too_short() {
        let req = ChangePasswordRequest {
            old_password: "old-password".to_string(),
            new_password1: "short".to_string(),
            new_password2: "short".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_category_serialization_skips_missing_parent() {
        let category = Category {
            id: Uuid::nil(),
            name: "Root".to_string(),
            slug: "root".to_string(),
            description: String::new(),
            parent_id: None,
        };
        let json = serde_json::to_value(&category).unwrap();
        assert!(json.get("parent_id").is_none());
        assert_eq!(category.to_string(), "Root");
    }
}
