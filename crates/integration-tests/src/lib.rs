//! Integration tests for Luxe Commerce.
//!
//! The tests drive the public service API (`CartLedger`, `OrderService`,
//! `WishlistService`) against the in-memory store, which shares its
//! semantics with the Postgres backend. Fixtures below keep the test
//! bodies focused on behavior rather than setup.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p luxe-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::Utc;

use luxe_commerce::models::{Address, Product};
use luxe_core::{Money, ProductId, Slug};

/// Builder for test products. Defaults: active, in stock, no variants.
pub struct ProductFixture {
    product: Product,
}

impl ProductFixture {
    /// Start a product with the given name, slug, and price.
    ///
    /// # Panics
    ///
    /// Panics on an invalid slug or price; fixtures use literals.
    #[must_use]
    pub fn new(name: &str, slug: &str, price: &str) -> Self {
        #[allow(clippy::unwrap_used)]
        let product = Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: None,
            price: Money::parse(price).unwrap(),
            original_price: None,
            images: Vec::new(),
            brand: Some("LUXE".to_owned()),
            sku: None,
            stock_quantity: 50,
            sizes: Vec::new(),
            colors: Vec::new(),
            is_active: true,
            is_featured: false,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        Self { product }
    }

    /// Set the available stock.
    #[must_use]
    pub fn stock(mut self, quantity: u32) -> Self {
        self.product.stock_quantity = quantity;
        self
    }

    /// Mark the product as hidden from the catalog.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.product.is_active = false;
        self
    }

    /// Give the product selectable sizes.
    #[must_use]
    pub fn sizes(mut self, sizes: &[&str]) -> Self {
        self.product.sizes = sizes.iter().map(|&s| s.to_owned()).collect();
        self
    }

    /// Finish the product.
    #[must_use]
    pub fn build(self) -> Product {
        self.product
    }
}

/// A plausible shipping/billing address.
#[must_use]
pub fn test_address() -> Address {
    Address {
        first_name: "John".to_owned(),
        last_name: "Doe".to_owned(),
        company: None,
        address_line_1: "123 Main St".to_owned(),
        address_line_2: None,
        city: "Portland".to_owned(),
        state: "OR".to_owned(),
        postal_code: "97201".to_owned(),
        country: "US".to_owned(),
    }
}

/// Shorthand for parsing money literals in assertions.
///
/// # Panics
///
/// Panics on an invalid amount; tests use literals.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn money(s: &str) -> Money {
    Money::parse(s).unwrap()
}
