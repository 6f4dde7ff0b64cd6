//! Domain types for the commerce core.
//!
//! These types represent validated domain objects separate from database row
//! types. The stores map rows into them; the services never see raw rows.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod wishlist;

pub use address::Address;
pub use cart::{CartLineItem, NewLineItem, ResolvedCartLine};
pub use order::{NewOrder, NewOrderLine, Order, OrderLineItem};
pub use product::{Category, Product, ProductFilter};
pub use wishlist::WishlistItem;
