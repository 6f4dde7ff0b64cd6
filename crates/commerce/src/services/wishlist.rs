//! Wishlist service.
//!
//! Saved-for-later products, one row per (user, product), with a
//! move-to-cart path that feeds the cart ledger's merge logic.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use luxe_core::{ProductId, UserId, VariantKey, WishlistItemId};

use crate::db::{CartStore, CatalogStore, RepositoryError, WishlistStore};
use crate::models::{Product, WishlistItem};
use crate::services::cart::{CartError, CartLedger};

/// Errors from wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// The wishlist item does not exist for this user.
    #[error("wishlist item not found")]
    NotFound,

    /// Moving to the cart failed; the wishlist row was left intact.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// The persistence layer failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A wishlist item joined with its resolved product.
#[derive(Debug, Clone)]
pub struct ResolvedWishlistItem {
    /// The wishlist row.
    pub item: WishlistItem,
    /// The product it references.
    pub product: Product,
}

/// The wishlist service.
pub struct WishlistService<S> {
    store: Arc<S>,
    ledger: CartLedger<S>,
}

impl<S> Clone for WishlistService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ledger: self.ledger.clone(),
        }
    }
}

impl<S: WishlistStore + CartStore + CatalogStore> WishlistService<S> {
    /// Create a wishlist service over a store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        let ledger = CartLedger::new(Arc::clone(&store));
        Self { store, ledger }
    }

    /// Save a product for later. Saving an already saved product is a
    /// no-op returning the existing row.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Repository`] if the store fails.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItem, WishlistError> {
        Ok(self.store.upsert_wishlist_item(user_id, product_id).await?)
    }

    /// Remove a saved product. Removing a non-existent ID is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Repository`] if the store fails.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: UserId,
        item_id: WishlistItemId,
    ) -> Result<(), WishlistError> {
        self.store.delete_wishlist_item(user_id, item_id).await?;
        Ok(())
    }

    /// The user's saved products, newest first, joined with the catalog.
    /// Vanished or deactivated products are silently excluded.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Repository`] if the store fails.
    #[instrument(skip(self))]
    pub async fn items(&self, user_id: UserId) -> Result<Vec<ResolvedWishlistItem>, WishlistError> {
        let items = self.store.wishlist_items(user_id).await?;

        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            match self.store.product(item.product_id).await? {
                Some(product) if product.is_active => {
                    resolved.push(ResolvedWishlistItem { item, product });
                }
                _ => {
                    tracing::warn!(
                        wishlist_item_id = %item.id,
                        product_id = %item.product_id,
                        "Wishlist references an unavailable product, hiding item"
                    );
                }
            }
        }
        Ok(resolved)
    }

    /// Move a saved product into the cart (one unit, no variant selection),
    /// then remove it from the wishlist.
    ///
    /// The cart add happens first: if it fails, the wishlist row survives.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::NotFound`] for a missing item, or
    /// [`WishlistError::Cart`] when the cart add fails.
    #[instrument(skip(self))]
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        item_id: WishlistItemId,
    ) -> Result<(), WishlistError> {
        let item = self
            .store
            .wishlist_item(user_id, item_id)
            .await?
            .ok_or(WishlistError::NotFound)?;

        self.ledger
            .add_item(user_id, item.product_id, 1, VariantKey::none())
            .await?;
        self.store.delete_wishlist_item(user_id, item_id).await?;
        Ok(())
    }
}
