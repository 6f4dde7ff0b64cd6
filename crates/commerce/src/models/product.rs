//! Product and category domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxe_core::{CategoryId, Money, ProductId, Slug};

/// A catalog product.
///
/// Read-only from the cart's perspective: `price`, `stock_quantity`,
/// `is_active`, `sizes`, and `colors` are authoritative inputs to the cart
/// ledger and pricing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: Slug,
    /// Long-form description.
    pub description: Option<String>,
    /// Current unit price.
    pub price: Money,
    /// Pre-discount price. When present and greater than `price`, the
    /// product is on sale.
    pub original_price: Option<Money>,
    /// Image URLs, first is the primary image.
    pub images: Vec<String>,
    /// Brand name.
    pub brand: Option<String>,
    /// Stock-keeping unit code.
    pub sku: Option<String>,
    /// Available-to-sell count.
    pub stock_quantity: u32,
    /// Selectable sizes; empty means no size choice required.
    pub sizes: Vec<String>,
    /// Selectable colors; empty means no color choice required.
    pub colors: Vec<String>,
    /// Catalog visibility.
    pub is_active: bool,
    /// Whether the product appears in featured listings.
    pub is_featured: bool,
    /// Owning category.
    pub category_id: Option<CategoryId>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is discounted from its original price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }

    /// Whether `quantity` units can currently be sold.
    #[must_use]
    pub const fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock_quantity >= quantity
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: Slug,
    /// Short description.
    pub description: Option<String>,
    /// Banner image URL.
    pub image_url: Option<String>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// Filter for active-product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Only featured products.
    pub featured_only: bool,
    /// Only products with a discount.
    pub on_sale_only: bool,
    /// Case-insensitive name substring match.
    pub query: Option<String>,
}

impl ProductFilter {
    /// Whether an (active) product passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category
            && product.category_id != Some(category)
        {
            return false;
        }
        if self.featured_only && !product.is_featured {
            return false;
        }
        if self.on_sale_only && !product.is_on_sale() {
            return false;
        }
        if let Some(query) = &self.query
            && !product.name.to_lowercase().contains(&query.to_lowercase())
        {
            return false;
        }
        true
    }
}
