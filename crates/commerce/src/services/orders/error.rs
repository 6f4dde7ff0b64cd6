//! Order service errors.

use thiserror::Error;

use luxe_core::{OrderStatus, ProductId};

use crate::db::RepositoryError;

/// Errors from order assembly and management.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout was attempted with no sellable cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line references a product that is inactive or lacks stock
    /// for the requested quantity.
    #[error("product unavailable: {product_id}")]
    ProductUnavailable {
        /// The unavailable product.
        product_id: ProductId,
    },

    /// The order does not exist for this user.
    #[error("order not found")]
    NotFound,

    /// The requested status change is not a legal transition.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// The multi-step order write failed. The cart was left intact for
    /// retry; `rolled_back` reports whether the store undid every partial
    /// write cleanly.
    #[error("order placement failed (rolled back: {rolled_back}): {source}")]
    Placement {
        /// Whether no partial order data remains.
        rolled_back: bool,
        /// The underlying persistence failure.
        source: RepositoryError,
    },

    /// The persistence layer failed outside the placement write.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
