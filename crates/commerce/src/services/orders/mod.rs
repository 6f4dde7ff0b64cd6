//! Order assembler and order management.
//!
//! Converts a non-empty cart plus shipping/billing addresses into a
//! persisted order with line-item snapshots, then empties the cart - all
//! as one logical transaction owned by the store. Also serves order
//! history and validates status transitions.

mod error;

pub use error::OrderError;

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::instrument;

use luxe_core::{LineItemId, OrderId, OrderStatus, UserId};

use crate::db::{CartStore, CatalogStore, OrderStore, RepositoryError};
use crate::models::{Address, NewOrder, NewOrderLine, Order, ResolvedCartLine};
use crate::services::pricing::{self, PricingConfig};

/// How many order-number collisions to absorb before giving up.
///
/// Collisions are vanishingly rare (6 random alphanumerics per day), so
/// more than one retry in a row already signals something badly wrong.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// The order assembler.
pub struct OrderService<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CartStore + CatalogStore + OrderStore> OrderService<S> {
    /// Create an order service over a store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Place an order from the user's current cart.
    ///
    /// Reads one snapshot of the cart, resolves every line against the
    /// catalog, prices it, and hands the store a single atomic write:
    /// addresses, order row (status `confirmed`), line snapshots with
    /// copied unit prices, and deletion of exactly the cart rows that were
    /// read. On any failure the cart is left intact for retry.
    ///
    /// Stock policy: availability is checked here (inactive or
    /// under-stocked products fail with
    /// [`OrderError::ProductUnavailable`]), but stock is not decremented.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`] when no sellable lines exist
    /// - [`OrderError::ProductUnavailable`] per the stock policy above
    /// - [`OrderError::Placement`] when the atomic write fails
    #[instrument(skip(self, shipping_address, billing_address, config))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        shipping_address: Address,
        billing_address: Address,
        config: &PricingConfig,
    ) -> Result<Order, OrderError> {
        let items = self.store.line_items(user_id).await?;
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        // Resolve the snapshot. Lines whose product vanished entirely are
        // dropped (and their rows still cleared with the order, matching
        // the cart view that already hides them); inactive or
        // under-stocked products abort checkout.
        let mut resolved: Vec<ResolvedCartLine> = Vec::with_capacity(items.len());
        let mut converted_line_items: Vec<LineItemId> = Vec::with_capacity(items.len());
        for item in items {
            let Some(product) = self.store.product(item.product_id).await? else {
                tracing::warn!(
                    line_item_id = %item.id,
                    product_id = %item.product_id,
                    "Cart line references a deleted product, dropping from order"
                );
                converted_line_items.push(item.id);
                continue;
            };

            if !product.is_active || !product.has_stock_for(item.quantity) {
                return Err(OrderError::ProductUnavailable {
                    product_id: product.id,
                });
            }

            converted_line_items.push(item.id);
            resolved.push(ResolvedCartLine { item, product });
        }

        if resolved.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let totals = pricing::quote(
            resolved
                .iter()
                .map(|line| (line.item.quantity, line.product.price)),
            config,
        );

        let lines: Vec<NewOrderLine> = resolved
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                quantity: line.item.quantity,
                // Copied, not referenced: later catalog price changes must
                // not alter this order.
                unit_price: line.product.price,
                variant: line.item.variant.clone(),
            })
            .collect();

        // Order-number collisions are transient: regenerate and retry
        // without surfacing them to the caller.
        let mut last_conflict: Option<RepositoryError> = None;
        for attempt in 0..MAX_ORDER_NUMBER_ATTEMPTS {
            let order = NewOrder {
                user_id,
                order_number: generate_order_number(),
                status: OrderStatus::Confirmed,
                subtotal: totals.subtotal,
                shipping_cost: totals.shipping_cost,
                tax_amount: totals.tax_amount,
                total_amount: totals.total_amount,
                shipping_address: shipping_address.clone(),
                billing_address: billing_address.clone(),
                lines: lines.clone(),
                converted_line_items: converted_line_items.clone(),
            };

            match self.store.persist_order(&order).await {
                Ok(placed) => {
                    tracing::info!(
                        order_id = %placed.id,
                        order_number = %placed.order_number,
                        total = %placed.total_amount,
                        "Order placed"
                    );
                    return Ok(placed);
                }
                Err(RepositoryError::Conflict(message)) => {
                    tracing::warn!(attempt, %message, "Order number collision, regenerating");
                    last_conflict = Some(RepositoryError::Conflict(message));
                }
                // Both backends write transactionally, so a failure here
                // left no partial order data behind.
                Err(source) => {
                    return Err(OrderError::Placement {
                        rolled_back: true,
                        source,
                    });
                }
            }
        }

        Err(OrderError::Placement {
            rolled_back: true,
            source: last_conflict.unwrap_or_else(|| {
                RepositoryError::Conflict("order number retries exhausted".to_owned())
            }),
        })
    }

    /// The user's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Repository`] if the store fails.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.orders_for_user(user_id).await?)
    }

    /// Fetch one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] when the order does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;
        if order.user_id != user_id {
            return Err(OrderError::NotFound);
        }
        Ok(order)
    }

    /// Move an order along its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for a missing order, or
    /// [`OrderError::InvalidStatusTransition`] when the state machine
    /// forbids the move.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<(), OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidStatusTransition {
                from: order.status,
                to: next,
            });
        }

        self.store.update_order_status(order_id, next).await?;
        tracing::info!(%order_id, from = %order.status, to = %next, "Order status updated");
        Ok(())
    }

    /// Cancel an order, legal from any pre-delivered state.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_status`].
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<(), OrderError> {
        self.update_status(order_id, OrderStatus::Cancelled).await
    }
}

/// Generate a candidate order number, e.g. `ORD-20260807-K3M9QX`.
///
/// The random token alone does not guarantee uniqueness - the store's
/// unique constraint does. Timestamp-only identifiers collide under
/// concurrent checkouts, hence the token plus constraint.
fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let token: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{date}-{token}")
}
