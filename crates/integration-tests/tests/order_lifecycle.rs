//! Order history and status lifecycle.

use std::sync::Arc;

use luxe_commerce::db::CatalogStore;
use luxe_commerce::db::memory::MemoryStore;
use luxe_commerce::models::Order;
use luxe_commerce::{CartLedger, OrderError, OrderService, PricingConfig};
use luxe_core::{OrderId, OrderStatus, UserId, VariantKey};

use luxe_integration_tests::{ProductFixture, test_address};

async fn place_one_order(store: &Arc<MemoryStore>, user: UserId) -> Order {
    // Each call seeds its own product; slugs are unique, so derive one
    // from a fresh UUID.
    let slug = format!("leather-wallet-{}", uuid::Uuid::new_v4().simple());
    let product = ProductFixture::new("Leather Wallet", &slug, "49.99").build();
    store.insert_product(&product).await.expect("seed");

    let ledger = CartLedger::new(Arc::clone(store));
    ledger
        .add_item(user, product.id, 1, VariantKey::none())
        .await
        .expect("add");

    OrderService::new(Arc::clone(store))
        .place_order(user, test_address(), test_address(), &PricingConfig::default())
        .await
        .expect("place order")
}

#[tokio::test]
async fn history_is_newest_first_and_per_user() {
    let store = Arc::new(MemoryStore::new());
    let orders = OrderService::new(Arc::clone(&store));
    let alice = UserId::generate();
    let bob = UserId::generate();

    let first = place_one_order(&store, alice).await;
    let second = place_one_order(&store, alice).await;
    place_one_order(&store, bob).await;

    let history = orders.orders_for_user(alice).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history.first().expect("newest").id, second.id);
    assert_eq!(history.last().expect("oldest").id, first.id);
}

#[tokio::test]
async fn order_lookup_enforces_ownership() {
    let store = Arc::new(MemoryStore::new());
    let orders = OrderService::new(Arc::clone(&store));
    let alice = UserId::generate();
    let bob = UserId::generate();

    let order = place_one_order(&store, alice).await;

    assert!(orders.order_for_user(alice, order.id).await.is_ok());
    assert!(matches!(
        orders.order_for_user(bob, order.id).await,
        Err(OrderError::NotFound)
    ));
    assert!(matches!(
        orders.order_for_user(alice, OrderId::generate()).await,
        Err(OrderError::NotFound)
    ));
}

#[tokio::test]
async fn status_walks_the_forward_chain() {
    let store = Arc::new(MemoryStore::new());
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();
    let order = place_one_order(&store, user).await;

    for next in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        orders.update_status(order.id, next).await.expect("advance");
    }

    let delivered = orders.order_for_user(user, order.id).await.expect("fetch");
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();
    let order = place_one_order(&store, user).await;

    // Confirmed cannot jump straight to shipped
    let result = orders.update_status(order.id, OrderStatus::Shipped).await;
    assert!(matches!(
        result,
        Err(OrderError::InvalidStatusTransition {
            from: OrderStatus::Confirmed,
            to: OrderStatus::Shipped,
        })
    ));

    // And the stored status is untouched
    let fetched = orders.order_for_user(user, order.id).await.expect("fetch");
    assert_eq!(fetched.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn cancel_is_terminal() {
    let store = Arc::new(MemoryStore::new());
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();
    let order = place_one_order(&store, user).await;

    orders.cancel_order(order.id).await.expect("cancel");

    let result = orders.update_status(order.id, OrderStatus::Processing).await;
    assert!(matches!(
        result,
        Err(OrderError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn delivered_orders_cannot_be_cancelled() {
    let store = Arc::new(MemoryStore::new());
    let orders = OrderService::new(Arc::clone(&store));
    let user = UserId::generate();
    let order = place_one_order(&store, user).await;

    for next in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        orders.update_status(order.id, next).await.expect("advance");
    }

    assert!(matches!(
        orders.cancel_order(order.id).await,
        Err(OrderError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn order_numbers_are_unique_across_orders() {
    let store = Arc::new(MemoryStore::new());
    let user = UserId::generate();

    let a = place_one_order(&store, user).await;
    let b = place_one_order(&store, user).await;
    assert_ne!(a.order_number, b.order_number);
}
