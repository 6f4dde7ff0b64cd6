//! Persistence interface and backends.
//!
//! The commerce services are written against the traits in this module so
//! the Postgres backend and the in-memory backend are interchangeable: the
//! same cart/order logic runs against both, and the test suite exercises it
//! through [`memory::MemoryStore`].
//!
//! ## Tables
//!
//! - `category`, `product` - catalog (read-only to cart/order logic)
//! - `cart_item` - one row per (user, product, size, color) tuple
//! - `address`, `orders`, `order_item` - immutable order snapshots
//! - `wishlist_item` - one row per (user, product)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/commerce/migrations/` and run via:
//! ```bash
//! cargo run -p luxe-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use luxe_core::{LineItemId, OrderId, OrderStatus, ProductId, Slug, UserId, WishlistItemId};

use crate::models::{
    CartLineItem, Category, NewLineItem, NewOrder, Order, Product, ProductFilter, WishlistItem,
};

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate order number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Read (and admin write) access to the product catalog.
///
/// Reads are side-effect free; the write operations exist for seeding and
/// the admin screens' data layer, and are never called by cart/order logic.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a product by ID, active or not.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Fetch a product by its unique slug.
    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError>;

    /// List active products passing the filter, newest first.
    async fn active_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// List all categories, by name.
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Insert a category; conflicts on a duplicate slug.
    async fn insert_category(&self, category: &Category) -> Result<(), RepositoryError>;

    /// Insert a product; conflicts on a duplicate slug.
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Toggle catalog visibility for a product.
    async fn set_product_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<(), RepositoryError>;
}

/// Cart line item storage.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Merge-or-insert on the (user, product, variant) tuple as a single
    /// atomic step: an existing line's quantity is incremented, otherwise a
    /// new line is created. Returns the resulting line.
    async fn upsert_line_item(&self, new: &NewLineItem) -> Result<CartLineItem, RepositoryError>;

    /// Fetch one line item owned by the user.
    async fn line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<Option<CartLineItem>, RepositoryError>;

    /// Replace a line item's quantity. `NotFound` if the user owns no such
    /// line.
    async fn set_line_item_quantity(
        &self,
        user_id: UserId,
        id: LineItemId,
        quantity: u32,
    ) -> Result<CartLineItem, RepositoryError>;

    /// Delete one line item. Returns whether a row was removed.
    async fn delete_line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<bool, RepositoryError>;

    /// Delete every line item for the user. Returns the number removed.
    async fn delete_all_line_items(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    /// All line items for the user, oldest first.
    async fn line_items(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RepositoryError>;

    /// Sum of quantities across the user's line items; 0 for an empty or
    /// non-existent cart.
    async fn quantity_total(&self, user_id: UserId) -> Result<u32, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist addresses, the order row, and all line snapshots, then delete
    /// exactly the cart rows named in `converted_line_items` - atomically.
    ///
    /// A duplicate `order_number` fails with [`RepositoryError::Conflict`]
    /// and persists nothing; the caller regenerates and retries.
    async fn persist_order(&self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// Fetch one order with its lines.
    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// All orders for the user, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Overwrite an order's status. `NotFound` if the order does not exist.
    /// Transition legality is the caller's concern.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError>;
}

/// Wishlist storage.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Insert-or-return on the (user, product) tuple; saving an already
    /// saved product returns the existing row.
    async fn upsert_wishlist_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItem, RepositoryError>;

    /// Fetch one wishlist item owned by the user.
    async fn wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<Option<WishlistItem>, RepositoryError>;

    /// Delete one wishlist item. Returns whether a row was removed.
    async fn delete_wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<bool, RepositoryError>;

    /// All wishlist items for the user, newest first.
    async fn wishlist_items(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError>;
}
