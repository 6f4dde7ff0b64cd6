//! Address value object.

use serde::{Deserialize, Serialize};

/// A shipping or billing address.
///
/// A disconnected value object: snapshotted onto an order at creation time
/// and never referenced elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}
