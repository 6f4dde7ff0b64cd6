//! Commerce services.
//!
//! - [`cart`] - Cart ledger: add/merge, quantity updates, removal, counts
//! - [`pricing`] - Pure totals computation
//! - [`orders`] - Order assembly, history, and status transitions
//! - [`wishlist`] - Saved products and move-to-cart

pub mod cart;
pub mod orders;
pub mod pricing;
pub mod wishlist;
