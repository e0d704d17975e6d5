use serde::{Deserialize, Serialize};

use storefront_core::money::{self, PRICE_MAX_MINOR};
use storefront_core::{DomainError, DomainResult, ProductId};

/// Largest stock count a product may hold.
pub const COUNT_MAX: u32 = 100_000;
/// Longest accepted title, in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 255;
/// Longest accepted image reference (local path or URL), in characters.
pub const IMAGE_MAX_CHARS: usize = 1024;

/// A sellable catalog product.
///
/// `price_minor` is the price in minor currency units; `count` is the stock
/// on hand, mutated by catalog updates and by payment reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub price_minor: u64,
    pub count: u32,
    pub description: String,
}

/// Validated-on-entry input for creating a product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub image: String,
    pub price: f64,
    pub count: i64,
    pub description: String,
}

impl NewProduct {
    /// Validate every field and produce the normalized product under `id`.
    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        Ok(Product {
            id,
            title: validate_title(&self.title)?,
            image: validate_image(self.image)?,
            price_minor: validate_price(self.price)?,
            count: validate_count(self.count)?,
            description: self.description,
        })
    }
}

/// Partial update: only the present fields are applied, each revalidated
/// with the same rules as creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub count: Option<i64>,
    pub description: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.image.is_none()
            && self.price.is_none()
            && self.count.is_none()
            && self.description.is_none()
    }

    /// Apply the present fields to `product`. Validation happens before any
    /// field is written, so a rejected patch leaves the product untouched.
    pub fn apply_to(&self, product: &mut Product) -> DomainResult<()> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let image = self.image.clone().map(validate_image).transpose()?;
        let price_minor = self.price.map(validate_price).transpose()?;
        let count = self.count.map(validate_count).transpose()?;

        if let Some(title) = title {
            product.title = title;
        }
        if let Some(image) = image {
            product.image = image;
        }
        if let Some(price_minor) = price_minor {
            product.price_minor = price_minor;
        }
        if let Some(count) = count {
            product.count = count;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        Ok(())
    }
}

fn validate_title(raw: &str) -> DomainResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title", "title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::validation(
            "title",
            format!("title exceeds {TITLE_MAX_CHARS} characters"),
        ));
    }
    Ok(title.to_string())
}

fn validate_image(image: String) -> DomainResult<String> {
    if image.chars().count() > IMAGE_MAX_CHARS {
        return Err(DomainError::validation(
            "image",
            format!("image reference exceeds {IMAGE_MAX_CHARS} characters"),
        ));
    }
    Ok(image)
}

fn validate_price(price: f64) -> DomainResult<u64> {
    if !price.is_finite() {
        return Err(DomainError::validation("price", "price must be a finite number"));
    }
    if price < 0.0 {
        return Err(DomainError::validation("price", "price cannot be negative"));
    }
    let minor = money::minor_from_major(price);
    if minor > PRICE_MAX_MINOR {
        return Err(DomainError::validation("price", "price is too high"));
    }
    Ok(minor)
}

fn validate_count(count: i64) -> DomainResult<u32> {
    if count < 0 {
        return Err(DomainError::validation("count", "count cannot be negative"));
    }
    if count > i64::from(COUNT_MAX) {
        return Err(DomainError::validation("count", "count is too large"));
    }
    Ok(count as u32)
}
