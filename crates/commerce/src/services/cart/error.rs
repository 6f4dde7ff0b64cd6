//! Cart service errors.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors from cart ledger operations.
///
/// Cart operations fail fast and locally: on error, nothing was mutated.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity is not positive.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// The line item does not exist for this user.
    #[error("cart line item not found")]
    NotFound,

    /// The persistence layer failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
