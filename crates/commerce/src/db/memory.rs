//! In-memory store for prototyping and tests.
//!
//! Behaviorally equivalent to the Postgres backend: the same trait methods,
//! the same conflict and not-found semantics, the same atomicity at the
//! operation level. State lives behind a single `RwLock`, so concurrent
//! reads never block each other and every write method is one indivisible
//! critical section. The store is an explicit value to construct and
//! inject - there is no global singleton.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use luxe_core::{
    LineItemId, OrderId, OrderItemId, OrderStatus, ProductId, Slug, UserId, WishlistItemId,
};

use crate::models::{
    CartLineItem, Category, NewLineItem, NewOrder, Order, OrderLineItem, Product, ProductFilter,
    WishlistItem,
};

use super::{CartStore, CatalogStore, OrderStore, RepositoryError, WishlistStore};

/// In-memory implementation of all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<Category>,
    products: HashMap<ProductId, Product>,
    cart_items: Vec<CartLineItem>,
    orders: Vec<Order>,
    wishlist: Vec<WishlistItem>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().find(|p| &p.slug == slug).cloned())
    }

    async fn active_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| p.is_active && filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut categories = tables.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.categories.iter().any(|c| c.slug == category.slug) {
            return Err(RepositoryError::Conflict(format!(
                "category slug already exists: {}",
                category.slug
            )));
        }
        tables.categories.push(category.clone());
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.products.values().any(|p| p.slug == product.slug) {
            return Err(RepositoryError::Conflict(format!(
                "product slug already exists: {}",
                product.slug
            )));
        }
        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn set_product_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let product = tables.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        product.is_active = is_active;
        product.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn upsert_line_item(&self, new: &NewLineItem) -> Result<CartLineItem, RepositoryError> {
        // Find-or-create runs under one write guard, so two concurrent adds
        // for the same tuple cannot both take the insert path.
        let mut tables = self.tables.write().await;
        if let Some(item) = tables.cart_items.iter_mut().find(|item| {
            item.user_id == new.user_id
                && item.product_id == new.product_id
                && item.variant == new.variant
        }) {
            item.quantity += new.quantity;
            return Ok(item.clone());
        }

        let item = CartLineItem {
            id: LineItemId::generate(),
            user_id: new.user_id,
            product_id: new.product_id,
            quantity: new.quantity,
            variant: new.variant.clone(),
            created_at: Utc::now(),
        };
        tables.cart_items.push(item.clone());
        Ok(item)
    }

    async fn line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<Option<CartLineItem>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .iter()
            .find(|item| item.id == id && item.user_id == user_id)
            .cloned())
    }

    async fn set_line_item_quantity(
        &self,
        user_id: UserId,
        id: LineItemId,
        quantity: u32,
    ) -> Result<CartLineItem, RepositoryError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .cart_items
            .iter_mut()
            .find(|item| item.id == id && item.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn delete_line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|item| !(item.id == id && item.user_id == user_id));
        Ok(tables.cart_items.len() < before)
    }

    async fn delete_all_line_items(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables.cart_items.retain(|item| item.user_id != user_id);
        Ok((before - tables.cart_items.len()) as u64)
    }

    async fn line_items(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RepositoryError> {
        // Insertion order doubles as oldest-first.
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .iter()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn quantity_total(&self, user_id: UserId) -> Result<u32, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .iter()
            .filter(|item| item.user_id == user_id)
            .map(|item| item.quantity)
            .sum())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn persist_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables
            .orders
            .iter()
            .any(|existing| existing.order_number == order.order_number)
        {
            return Err(RepositoryError::Conflict(format!(
                "order number already exists: {}",
                order.order_number
            )));
        }

        let lines = order
            .lines
            .iter()
            .map(|line| OrderLineItem {
                id: OrderItemId::generate(),
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                variant: line.variant.clone(),
            })
            .collect();

        let persisted = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            order_number: order.order_number.clone(),
            status: order.status,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            tax_amount: order.tax_amount,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            created_at: Utc::now(),
            lines,
        };

        // Clear exactly the rows that were converted; anything added to the
        // cart since the snapshot was read survives.
        tables.cart_items.retain(|item| {
            !(item.user_id == order.user_id && order.converted_line_items.contains(&item.id))
        });

        tables.orders.push(persisted.clone());
        Ok(persisted)
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.orders.iter().find(|order| order.id == id).cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        // Appended chronologically, so reverse insertion order is newest
        // first even when timestamps tie.
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .rev()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        Ok(())
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn upsert_wishlist_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItem, RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(item) = tables
            .wishlist
            .iter()
            .find(|item| item.user_id == user_id && item.product_id == product_id)
        {
            return Ok(item.clone());
        }

        let item = WishlistItem {
            id: WishlistItemId::generate(),
            user_id,
            product_id,
            created_at: Utc::now(),
        };
        tables.wishlist.push(item.clone());
        Ok(item)
    }

    async fn wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<Option<WishlistItem>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .wishlist
            .iter()
            .find(|item| item.id == id && item.user_id == user_id)
            .cloned())
    }

    async fn delete_wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.wishlist.len();
        tables
            .wishlist
            .retain(|item| !(item.id == id && item.user_id == user_id));
        Ok(tables.wishlist.len() < before)
    }

    async fn wishlist_items(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .wishlist
            .iter()
            .rev()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }
}
