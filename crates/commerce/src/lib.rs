//! Luxe Commerce - cart, pricing, and order library.
//!
//! This crate is the commerce core behind the Luxe storefront UI: the cart
//! ledger, the pricing engine, the order assembler, and the wishlist, all
//! written against swappable persistence backends.
//!
//! # Architecture
//!
//! - [`models`] - Domain types (products, cart lines, orders, addresses)
//! - [`db`] - Persistence traits plus the Postgres and in-memory backends
//! - [`catalog`] - Cached read access to the product catalog
//! - [`services`] - Cart ledger, pricing engine, order assembler, wishlist
//! - [`config`] - Environment-based configuration
//!
//! The presentation layer (routing, templates, toasts) lives outside this
//! crate and consumes plain data structures; nothing here touches HTTP.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

pub use catalog::CachedCatalog;
pub use services::cart::{CartError, CartLedger};
pub use services::orders::{OrderError, OrderService};
pub use services::pricing::{PricingConfig, Totals};
pub use services::wishlist::{WishlistError, WishlistService};
