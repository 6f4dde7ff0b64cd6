//! Cart ledger service.
//!
//! Owns all cart mutations for a user. Line items merge on the
//! (user, product, size, color) tuple, quantities never drop below 1 via
//! `set_quantity`, and removal is the only path to deletion.

mod error;

pub use error::CartError;

use std::sync::Arc;

use tracing::instrument;

use luxe_core::{LineItemId, ProductId, UserId, VariantKey};

use crate::db::{CartStore, CatalogStore};
use crate::models::{CartLineItem, NewLineItem, ResolvedCartLine};

/// The cart ledger.
///
/// Generic over the store so the Postgres and in-memory backends run
/// through identical logic.
pub struct CartLedger<S> {
    store: Arc<S>,
}

impl<S> Clone for CartLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CartStore + CatalogStore> CartLedger<S> {
    /// Create a ledger over a store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add units of a product+variant to the cart.
    ///
    /// If a line item for the exact (product, size, color) tuple already
    /// exists, its quantity is incremented; otherwise a new line is
    /// created. The ledger itself enforces no upper bound - stock limits
    /// are a presentation-layer concern.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, leaving
    /// the cart unchanged.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        variant: VariantKey,
    ) -> Result<CartLineItem, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let item = self
            .store
            .upsert_line_item(&NewLineItem {
                user_id,
                product_id,
                quantity,
                variant,
            })
            .await?;

        tracing::info!(line_item_id = %item.id, quantity = item.quantity, "Added to cart");
        Ok(item)
    }

    /// Replace a line item's quantity.
    ///
    /// A quantity of zero does not remove the item - it is floored to 1.
    /// [`Self::remove_item`] is the only path to deletion.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the user owns no such line item.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        line_item_id: LineItemId,
        quantity: u32,
    ) -> Result<CartLineItem, CartError> {
        let quantity = quantity.max(1);
        self.store
            .set_line_item_quantity(user_id, line_item_id, quantity)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => CartError::NotFound,
                other => CartError::Repository(other),
            })
    }

    /// Remove a line item. Removing a non-existent ID is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] only if the store fails.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        line_item_id: LineItemId,
    ) -> Result<(), CartError> {
        self.store.delete_line_item(user_id, line_item_id).await?;
        Ok(())
    }

    /// Delete every line item for the user. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] only if the store fails.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        let removed = self.store.delete_all_line_items(user_id).await?;
        tracing::info!(removed, "Cleared cart");
        Ok(())
    }

    /// The user's cart lines joined with their resolved products.
    ///
    /// A line whose product can no longer be resolved (deleted or
    /// deactivated) is silently excluded rather than failing the whole
    /// cart read.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] if the store fails.
    #[instrument(skip(self))]
    pub async fn items(&self, user_id: UserId) -> Result<Vec<ResolvedCartLine>, CartError> {
        let items = self.store.line_items(user_id).await?;

        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            match self.store.product(item.product_id).await? {
                Some(product) if product.is_active => {
                    resolved.push(ResolvedCartLine { item, product });
                }
                _ => {
                    tracing::warn!(
                        line_item_id = %item.id,
                        product_id = %item.product_id,
                        "Cart references an unavailable product, hiding line"
                    );
                }
            }
        }
        Ok(resolved)
    }

    /// Sum of quantities across the user's line items, for badge displays.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] if the store fails.
    #[instrument(skip(self))]
    pub async fn item_count(&self, user_id: UserId) -> Result<u32, CartError> {
        Ok(self.store.quantity_total(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use chrono::Utc;
    use luxe_core::{Money, Slug};

    use crate::models::Product;

    fn product(name: &str, slug: &str, price: &str, active: bool) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: None,
            price: Money::parse(price).unwrap(),
            original_price: None,
            images: Vec::new(),
            brand: Some("LUXE".to_owned()),
            sku: None,
            stock_quantity: 50,
            sizes: vec!["S".to_owned(), "M".to_owned()],
            colors: vec!["Black".to_owned()],
            is_active: active,
            is_featured: false,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn ledger_with_product(product: &Product) -> CartLedger<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_product(product).await.unwrap();
        CartLedger::new(store)
    }

    #[tokio::test]
    async fn test_repeated_adds_merge_into_one_line() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();
        let variant = VariantKey::new(Some("M"), Some("Black"));

        ledger
            .add_item(user, shirt.id, 2, variant.clone())
            .await
            .unwrap();
        ledger
            .add_item(user, shirt.id, 3, variant.clone())
            .await
            .unwrap();

        let items = ledger.items(user).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().item.quantity, 5);
        assert_eq!(items.first().unwrap().item.variant, variant);
    }

    #[tokio::test]
    async fn test_different_variants_get_separate_lines() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();

        ledger
            .add_item(user, shirt.id, 1, VariantKey::new(Some("S"), None::<String>))
            .await
            .unwrap();
        ledger
            .add_item(user, shirt.id, 1, VariantKey::new(Some("M"), None::<String>))
            .await
            .unwrap();
        // No selection is its own tuple, distinct from any sized line
        ledger
            .add_item(user, shirt.id, 1, VariantKey::none())
            .await
            .unwrap();

        assert_eq!(ledger.items(user).await.unwrap().len(), 3);
        assert_eq!(ledger.item_count(user).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_add_zero_quantity_fails_and_changes_nothing() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();

        let result = ledger.add_item(user, shirt.id, 0, VariantKey::none()).await;
        assert!(matches!(result, Err(CartError::InvalidQuantity)));
        assert_eq!(ledger.item_count(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_quantity_floors_to_one() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();

        let item = ledger
            .add_item(user, shirt.id, 4, VariantKey::none())
            .await
            .unwrap();

        let updated = ledger.set_quantity(user, item.id, 0).await.unwrap();
        assert_eq!(updated.quantity, 1);

        // Still present - only remove_item deletes
        assert_eq!(ledger.items(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_quantity_on_missing_line_fails() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();

        let result = ledger.set_quantity(user, LineItemId::generate(), 2).await;
        assert!(matches!(result, Err(CartError::NotFound)));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();

        let item = ledger
            .add_item(user, shirt.id, 1, VariantKey::none())
            .await
            .unwrap();

        ledger.remove_item(user, item.id).await.unwrap();
        // Second removal of the same ID is a no-op, not an error
        ledger.remove_item(user, item.id).await.unwrap();
        assert!(ledger.items(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_items_hides_deactivated_products() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let store = Arc::new(MemoryStore::new());
        store.insert_product(&shirt).await.unwrap();
        let ledger = CartLedger::new(Arc::clone(&store));
        let user = UserId::generate();

        ledger
            .add_item(user, shirt.id, 2, VariantKey::none())
            .await
            .unwrap();
        store.set_product_active(shirt.id, false).await.unwrap();

        // The line is hidden, never an error; the raw count still sees it
        assert!(ledger.items(user).await.unwrap().is_empty());
        assert_eq!(ledger.item_count(user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_carts_are_independent_per_user() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let alice = UserId::generate();
        let bob = UserId::generate();

        ledger
            .add_item(alice, shirt.id, 2, VariantKey::none())
            .await
            .unwrap();
        ledger
            .add_item(bob, shirt.id, 1, VariantKey::none())
            .await
            .unwrap();

        ledger.clear(alice).await.unwrap();
        assert_eq!(ledger.item_count(alice).await.unwrap(), 0);
        assert_eq!(ledger.item_count(bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_merge_to_one_line() {
        let shirt = product("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99", true);
        let ledger = ledger_with_product(&shirt).await;
        let user = UserId::generate();

        let a = ledger.clone();
        let b = ledger.clone();
        let variant = VariantKey::new(Some("M"), None::<String>);
        let (left, right) = tokio::join!(
            a.add_item(user, shirt.id, 1, variant.clone()),
            b.add_item(user, shirt.id, 1, variant.clone()),
        );
        left.unwrap();
        right.unwrap();

        let items = ledger.items(user).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().item.quantity, 2);
    }
}
