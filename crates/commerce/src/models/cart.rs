//! Cart line item domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxe_core::{LineItemId, Money, ProductId, UserId, VariantKey};

use super::product::Product;

/// One line in a user's cart.
///
/// At most one line item exists per (user, product, variant) tuple; adding
/// the same combination again increments the quantity of the existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Unique line item ID.
    pub id: LineItemId,
    /// Owning user.
    pub user_id: UserId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Unit count, always positive.
    pub quantity: u32,
    /// Selected variant dimensions.
    pub variant: VariantKey,
    /// When the line was first added.
    pub created_at: DateTime<Utc>,
}

/// Input for an atomic merge-or-insert into the cart.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    /// Owning user.
    pub user_id: UserId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Units to add, always positive.
    pub quantity: u32,
    /// Selected variant dimensions.
    pub variant: VariantKey,
}

/// A cart line joined with its resolved product.
#[derive(Debug, Clone)]
pub struct ResolvedCartLine {
    /// The cart line.
    pub item: CartLineItem,
    /// The product it references.
    pub product: Product,
}

impl ResolvedCartLine {
    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.price.times(self.item.quantity)
    }
}
