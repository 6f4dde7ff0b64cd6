//! End-to-end checkout: cart -> pricing -> order placement.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use luxe_commerce::db::memory::MemoryStore;
use luxe_commerce::db::{
    CartStore, CatalogStore, OrderStore, RepositoryError,
};
use luxe_commerce::models::{
    CartLineItem, Category, NewLineItem, NewOrder, Order, Product, ProductFilter,
};
use luxe_commerce::{CartLedger, OrderError, OrderService, PricingConfig};
use luxe_core::{
    LineItemId, Money, OrderId, OrderStatus, ProductId, Slug, UserId, VariantKey,
};

use luxe_integration_tests::{ProductFixture, money, test_address};

async fn seeded_store(products: &[Product]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for product in products {
        store.insert_product(product).await.expect("seed product");
    }
    store
}

#[tokio::test]
async fn place_order_on_empty_cart_fails_and_creates_nothing() {
    let store = seeded_store(&[]).await;
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    let result = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await;

    assert!(matches!(result, Err(OrderError::EmptyCart)));
    assert!(orders.orders_for_user(user).await.expect("history").is_empty());
}

#[tokio::test]
async fn successful_placement_snapshots_cart_and_clears_it() {
    // The worked scenario: 2 x 29.99 + 1 x 199.99 with the default config.
    let shirt = ProductFixture::new("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99")
        .sizes(&["S", "M", "L"])
        .build();
    let headphones =
        ProductFixture::new("Wireless Headphones", "wireless-headphones", "199.99").build();
    let store = seeded_store(&[shirt.clone(), headphones.clone()]).await;
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, shirt.id, 2, VariantKey::new(Some("M"), None::<String>))
        .await
        .expect("add shirt");
    ledger
        .add_item(user, headphones.id, 1, VariantKey::none())
        .await
        .expect("add headphones");

    let order = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await
        .expect("place order");

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.subtotal, money("259.97"));
    assert_eq!(order.shipping_cost, Money::ZERO);
    assert_eq!(order.tax_amount, money("20.80"));
    assert_eq!(order.total_amount, money("280.77"));
    assert_eq!(
        order.total_amount,
        order.subtotal + order.shipping_cost + order.tax_amount
    );

    // One snapshot per pre-checkout line, with copied prices
    assert_eq!(order.lines.len(), 2);
    let shirt_line = order
        .lines
        .iter()
        .find(|line| line.product_id == shirt.id)
        .expect("shirt line");
    assert_eq!(shirt_line.quantity, 2);
    assert_eq!(shirt_line.unit_price, money("29.99"));
    assert_eq!(shirt_line.product_name, "Premium Cotton T-Shirt");
    assert_eq!(shirt_line.variant, VariantKey::new(Some("M"), None::<String>));

    // The cart is empty afterwards
    assert_eq!(ledger.item_count(user).await.expect("count"), 0);
    assert!(ledger.items(user).await.expect("items").is_empty());

    // And the order shows up in history
    let history = orders.orders_for_user(user).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history.first().expect("first").id, order.id);
}

#[tokio::test]
async fn below_threshold_order_pays_flat_shipping() {
    let wallet = ProductFixture::new("Leather Wallet", "leather-wallet", "49.99").build();
    let store = seeded_store(&[wallet.clone()]).await;
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, wallet.id, 1, VariantKey::none())
        .await
        .expect("add");

    let order = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await
        .expect("place order");

    assert_eq!(order.subtotal, money("49.99"));
    assert_eq!(order.shipping_cost, money("9.99"));
    assert_eq!(order.tax_amount, money("4.00"));
    assert_eq!(order.total_amount, money("63.98"));
}

#[tokio::test]
async fn later_price_change_does_not_alter_the_order() {
    let watch = ProductFixture::new("Minimalist Watch", "minimalist-watch", "149.99").build();
    let store = seeded_store(&[watch.clone()]).await;
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, watch.id, 1, VariantKey::none())
        .await
        .expect("add");
    let order = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await
        .expect("place order");

    // Replace the product with a repriced edition
    store.set_product_active(watch.id, false).await.expect("deactivate");
    let repriced = ProductFixture::new("Minimalist Watch v2", "minimalist-watch-v2", "999.99").build();
    store.insert_product(&repriced).await.expect("insert");

    let fetched = orders.order_for_user(user, order.id).await.expect("fetch");
    assert_eq!(
        fetched.lines.first().expect("line").unit_price,
        money("149.99")
    );
    assert_eq!(fetched.total_amount, order.total_amount);
}

#[tokio::test]
async fn inactive_product_aborts_checkout_and_keeps_cart() {
    let jacket =
        ProductFixture::new("Designer Leather Jacket", "designer-leather-jacket", "299.99").build();
    let store = seeded_store(&[jacket.clone()]).await;
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, jacket.id, 1, VariantKey::none())
        .await
        .expect("add");
    store.set_product_active(jacket.id, false).await.expect("deactivate");

    let result = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await;

    assert!(matches!(
        result,
        Err(OrderError::ProductUnavailable { product_id }) if product_id == jacket.id
    ));
    // The raw cart row survives for retry once the product returns
    assert_eq!(ledger.item_count(user).await.expect("count"), 1);
}

#[tokio::test]
async fn understocked_product_aborts_checkout() {
    let sneakers = ProductFixture::new("Classic Sneakers", "classic-sneakers", "89.99")
        .stock(2)
        .build();
    let store = seeded_store(&[sneakers.clone()]).await;
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, sneakers.id, 3, VariantKey::none())
        .await
        .expect("add");

    let result = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await;

    assert!(matches!(result, Err(OrderError::ProductUnavailable { .. })));
    assert_eq!(ledger.item_count(user).await.expect("count"), 3);
}

#[tokio::test]
async fn lines_added_after_the_snapshot_survive_placement() {
    let shirt = ProductFixture::new("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99").build();
    let wallet = ProductFixture::new("Leather Wallet", "leather-wallet", "49.99").build();
    let store = seeded_store(&[shirt.clone(), wallet.clone()]).await;
    let ledger = CartLedger::new(Arc::clone(&store));
    let user = UserId::generate();

    let converted = ledger
        .add_item(user, shirt.id, 1, VariantKey::none())
        .await
        .expect("add shirt");

    // Hand the store a snapshot that only covers the shirt line, the way
    // place_order does, then add the wallet before the write lands.
    ledger
        .add_item(user, wallet.id, 1, VariantKey::none())
        .await
        .expect("add wallet");

    let order = NewOrder {
        user_id: user,
        order_number: "ORD-20260807-TEST01".to_owned(),
        status: OrderStatus::Confirmed,
        subtotal: money("29.99"),
        shipping_cost: money("9.99"),
        tax_amount: money("2.40"),
        total_amount: money("42.38"),
        shipping_address: test_address(),
        billing_address: test_address(),
        lines: Vec::new(),
        converted_line_items: vec![converted.id],
    };
    store.persist_order(&order).await.expect("persist");

    // Only the converted row was cleared
    let remaining = ledger.items(user).await.expect("items");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.first().expect("line").product.id, wallet.id);
}

// =============================================================================
// Failure injection
// =============================================================================

/// Store wrapper that makes `persist_order` fail a fixed number of times,
/// either as a transient order-number conflict or a hard database-shaped
/// failure.
struct FailingStore {
    inner: Arc<MemoryStore>,
    failures_remaining: AtomicU32,
    conflict: bool,
}

impl FailingStore {
    fn new(inner: Arc<MemoryStore>, failures: u32, conflict: bool) -> Self {
        Self {
            inner,
            failures_remaining: AtomicU32::new(failures),
            conflict,
        }
    }
}

#[async_trait]
impl CatalogStore for FailingStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.inner.product(id).await
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
        self.inner.insert_product(product).await
    }
    async fn set_product_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        self.inner.set_product_active(id, is_active).await
    }
}

#[async_trait]
impl CartStore for FailingStore {
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
impl OrderStore for FailingStore {
    async fn persist_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            if self.conflict {
                return Err(RepositoryError::Conflict(
                    "order number already exists".to_owned(),
                ));
            }
            return Err(RepositoryError::DataCorruption("disk on fire".to_owned()));
        }
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

#[tokio::test]
async fn order_number_collisions_are_retried_internally() {
    let shirt = ProductFixture::new("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99").build();
    let inner = seeded_store(&[shirt.clone()]).await;
    let store = Arc::new(FailingStore::new(Arc::clone(&inner), 2, true));
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, shirt.id, 1, VariantKey::none())
        .await
        .expect("add");

    // Two collisions get absorbed, the third attempt lands
    let order = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await
        .expect("place order despite collisions");
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(ledger.item_count(user).await.expect("count"), 0);
}

#[tokio::test]
async fn persistent_failure_surfaces_and_leaves_cart_intact() {
    let shirt = ProductFixture::new("Premium Cotton T-Shirt", "premium-cotton-t-shirt", "29.99").build();
    let inner = seeded_store(&[shirt.clone()]).await;
    let store = Arc::new(FailingStore::new(Arc::clone(&inner), u32::MAX, false));
    let ledger = CartLedger::new(Arc::clone(&store));
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();

    ledger
        .add_item(user, shirt.id, 2, VariantKey::none())
        .await
        .expect("add");

    let result = orders
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await;

    assert!(matches!(
        result,
        Err(OrderError::Placement { rolled_back: true, .. })
    ));
    // The cart must never be silently cleared on failure
    assert_eq!(ledger.item_count(user).await.expect("count"), 2);
    assert!(orders.orders_for_user(user).await.expect("history").is_empty());
}
