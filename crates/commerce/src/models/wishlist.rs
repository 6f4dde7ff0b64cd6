//! Wishlist domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxe_core::{ProductId, UserId, WishlistItemId};

/// One product saved for later by a user.
///
/// At most one row exists per (user, product); saving again is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Unique wishlist item ID.
    pub id: WishlistItemId,
    /// Owning user.
    pub user_id: UserId,
    /// Saved product.
    pub product_id: ProductId,
    /// When the product was saved.
    pub created_at: DateTime<Utc>,
}
