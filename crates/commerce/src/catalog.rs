//! Cached read access to the product catalog.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use luxe_core::{LineItemId, OrderId, OrderStatus, ProductId, Slug, UserId, WishlistItemId};

use crate::db::{CartStore, CatalogStore, OrderStore, RepositoryError, WishlistStore};
use crate::models::{
    CartLineItem, Category, NewLineItem, NewOrder, Order, Product, ProductFilter, WishlistItem,
};

/// Default time-to-live for cached products.
const DEFAULT_PRODUCT_TTL: Duration = Duration::from_secs(60);

/// Maximum number of products held in the cache.
const PRODUCT_CACHE_CAPACITY: u64 = 10_000;

/// A caching wrapper around any [`CatalogStore`].
///
/// Product-by-ID lookups are the hot path - every cart read resolves each
/// line against the catalog - so those are cached with a short TTL. List
/// queries and slug lookups pass through. Admin writes invalidate the
/// affected entry.
pub struct CachedCatalog<S> {
    inner: Arc<S>,
    products: Cache<ProductId, Product>,
}

impl<S: CatalogStore> CachedCatalog<S> {
    /// Wrap a catalog store with the default TTL.
    #[must_use]
    pub fn new(inner: Arc<S>) -> Self {
        Self::with_ttl(inner, DEFAULT_PRODUCT_TTL)
    }

    /// Wrap a catalog store with an explicit TTL.
    #[must_use]
    pub fn with_ttl(inner: Arc<S>, ttl: Duration) -> Self {
        Self {
            inner,
            products: Cache::builder()
                .max_capacity(PRODUCT_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for CachedCatalog<S> {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(product) = self.products.get(&id).await {
            return Ok(Some(product));
        }

        let fetched = self.inner.product(id).await?;
        if let Some(product) = &fetched {
            self.products.insert(id, product.clone()).await;
        }
        Ok(fetched)
    }

    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        self.inner.product_by_slug(slug).await
    }

    async fn active_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.inner.active_products(filter).await
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.inner.categories().await
    }

    async fn insert_category(&self, category: &Category) -> Result<(), RepositoryError> {
        self.inner.insert_category(category).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        self.inner.insert_product(product).await?;
        self.products.invalidate(&product.id).await;
        Ok(())
    }

    async fn set_product_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        self.inner.set_product_active(id, is_active).await?;
        self.products.invalidate(&id).await;
        Ok(())
    }
}

// The remaining store traits pass straight through, so a
// `CachedCatalog<PgStore>` serves the whole service stack with cached
// product resolution on the cart's hot path.

#[async_trait]
impl<S: CartStore + CatalogStore> CartStore for CachedCatalog<S> {
    async fn upsert_line_item(&self, new: &NewLineItem) -> Result<CartLineItem, RepositoryError> {
        self.inner.upsert_line_item(new).await
    }

    async fn line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<Option<CartLineItem>, RepositoryError> {
        self.inner.line_item(user_id, id).await
    }

    async fn set_line_item_quantity(
        &self,
        user_id: UserId,
        id: LineItemId,
        quantity: u32,
    ) -> Result<CartLineItem, RepositoryError> {
        self.inner.set_line_item_quantity(user_id, id, quantity).await
    }

    async fn delete_line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<bool, RepositoryError> {
        self.inner.delete_line_item(user_id, id).await
    }

    async fn delete_all_line_items(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.inner.delete_all_line_items(user_id).await
    }

    async fn line_items(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RepositoryError> {
        self.inner.line_items(user_id).await
    }

    async fn quantity_total(&self, user_id: UserId) -> Result<u32, RepositoryError> {
        self.inner.quantity_total(user_id).await
    }
}

#[async_trait]
impl<S: OrderStore + CatalogStore> OrderStore for CachedCatalog<S> {
    async fn persist_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        self.inner.persist_order(order).await
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.inner.order(id).await
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        self.inner.orders_for_user(user_id).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update_order_status(id, status).await
    }
}

#[async_trait]
impl<S: WishlistStore + CatalogStore> WishlistStore for CachedCatalog<S> {
    async fn upsert_wishlist_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItem, RepositoryError> {
        self.inner.upsert_wishlist_item(user_id, product_id).await
    }

    async fn wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<Option<WishlistItem>, RepositoryError> {
        self.inner.wishlist_item(user_id, id).await
    }

    async fn delete_wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<bool, RepositoryError> {
        self.inner.delete_wishlist_item(user_id, id).await
    }

    async fn wishlist_items(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        self.inner.wishlist_items(user_id).await
    }
}
