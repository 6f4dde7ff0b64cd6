//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxe_core::{LineItemId, Money, OrderId, OrderItemId, OrderStatus, ProductId, UserId, VariantKey};

use super::address::Address;

/// A placed order with its line-item snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// Human-readable unique order number, e.g. `ORD-20260807-K3M9QX`.
    pub order_number: String,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Sum of line totals, rounded to cents.
    pub subtotal: Money,
    /// Flat shipping cost, or zero above the free-shipping threshold.
    pub shipping_cost: Money,
    /// Tax on the subtotal, rounded to cents.
    pub tax_amount: Money,
    /// `subtotal + shipping_cost + tax_amount`.
    pub total_amount: Money,
    /// Shipping address snapshot.
    pub shipping_address: Address,
    /// Billing address snapshot.
    pub billing_address: Address,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Line-item snapshots, in cart order.
    pub lines: Vec<OrderLineItem>,
}

/// An immutable snapshot of one cart line at order time.
///
/// `unit_price` and `product_name` are copies, not live references, so
/// historical orders stay accurate when the catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Unique order line ID.
    pub id: OrderItemId,
    /// The product this line was created from.
    pub product_id: ProductId,
    /// Product name at order time.
    pub product_name: String,
    /// Unit count.
    pub quantity: u32,
    /// Unit price at order time.
    pub unit_price: Money,
    /// Selected variant dimensions.
    pub variant: VariantKey,
}

impl OrderLineItem {
    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Everything the store needs to persist an order atomically.
///
/// The store writes both addresses, the order row, and all line snapshots,
/// then deletes exactly the cart rows in `converted_line_items` - as one
/// transaction. Any failure leaves the cart untouched.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Owning user.
    pub user_id: UserId,
    /// Candidate order number; the store rejects duplicates with a conflict.
    pub order_number: String,
    /// Initial status, `confirmed` for checkout orders.
    pub status: OrderStatus,
    /// Sum of line totals, rounded to cents.
    pub subtotal: Money,
    /// Shipping cost for this order.
    pub shipping_cost: Money,
    /// Tax amount, rounded to cents.
    pub tax_amount: Money,
    /// Grand total.
    pub total_amount: Money,
    /// Shipping address snapshot.
    pub shipping_address: Address,
    /// Billing address snapshot.
    pub billing_address: Address,
    /// Line snapshots to persist, in cart order.
    pub lines: Vec<NewOrderLine>,
    /// Cart rows to delete once the order row commits.
    pub converted_line_items: Vec<LineItemId>,
}

/// Input for one order line snapshot.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// The product being snapshotted.
    pub product_id: ProductId,
    /// Product name at order time.
    pub product_name: String,
    /// Unit count.
    pub quantity: u32,
    /// Unit price at order time.
    pub unit_price: Money,
    /// Selected variant dimensions.
    pub variant: VariantKey,
}
