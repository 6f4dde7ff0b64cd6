//! Seed the database with the demo catalog.
//!
//! Loads a small catalog of categories and products for local development
//! and prototyping without a populated backend. Rows that already exist
//! (by slug) are skipped, so re-running is safe.

use chrono::Utc;

use luxe_commerce::config::CommerceConfig;
use luxe_commerce::db::postgres::PgStore;
use luxe_commerce::db::{self, CatalogStore, RepositoryError};
use luxe_commerce::models::{Category, Product};
use luxe_core::{CategoryId, Money, ProductId, Slug};

/// Seed the demo catalog.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or an insert fails for a reason other than a duplicate.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CommerceConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = PgStore::new(pool);

    for category in demo_categories()? {
        match store.insert_category(&category).await {
            Ok(()) => tracing::info!(slug = %category.slug, "Seeded category"),
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(slug = %category.slug, "Category already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Re-read so product rows reference the persisted category IDs even
    // when a previous seed already created them.
    let categories = store.categories().await?;

    for product in demo_products(&categories)? {
        match store.insert_product(&product).await {
            Ok(()) => tracing::info!(slug = %product.slug, "Seeded product"),
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(slug = %product.slug, "Product already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("Seed complete!");
    Ok(())
}

fn demo_categories() -> Result<Vec<Category>, Box<dyn std::error::Error>> {
    let entries = [
        ("Clothing", "clothing", "Stylish apparel"),
        ("Accessories", "accessories", "Fashion accessories"),
        ("Shoes", "shoes", "Footwear collection"),
        ("Electronics", "electronics", "Tech gadgets"),
    ];

    entries
        .into_iter()
        .map(|(name, slug, description)| {
            Ok(Category {
                id: CategoryId::generate(),
                name: name.to_owned(),
                slug: Slug::parse(slug)?,
                description: Some(description.to_owned()),
                image_url: None,
                created_at: Utc::now(),
            })
        })
        .collect()
}

struct DemoProduct<'a> {
    name: &'a str,
    slug: &'a str,
    price: &'a str,
    original_price: Option<&'a str>,
    description: &'a str,
    category_slug: &'a str,
    sku: &'a str,
    stock_quantity: u32,
    sizes: &'a [&'a str],
    colors: &'a [&'a str],
    is_featured: bool,
}

fn demo_products(categories: &[Category]) -> Result<Vec<Product>, Box<dyn std::error::Error>> {
    let entries = [
        DemoProduct {
            name: "Premium Cotton T-Shirt",
            slug: "premium-cotton-t-shirt",
            price: "29.99",
            original_price: Some("39.99"),
            description: "Soft, comfortable cotton t-shirt made from premium materials. \
                          Perfect for everyday wear.",
            category_slug: "clothing",
            sku: "TSH-001",
            stock_quantity: 50,
            sizes: &["XS", "S", "M", "L", "XL"],
            colors: &["White", "Black", "Navy", "Gray"],
            is_featured: true,
        },
        DemoProduct {
            name: "Designer Leather Jacket",
            slug: "designer-leather-jacket",
            price: "299.99",
            original_price: Some("399.99"),
            description: "Genuine leather jacket with premium craftsmanship. A timeless \
                          piece for your wardrobe.",
            category_slug: "clothing",
            sku: "JKT-001",
            stock_quantity: 15,
            sizes: &["S", "M", "L", "XL"],
            colors: &["Black", "Brown"],
            is_featured: true,
        },
        DemoProduct {
            name: "Wireless Headphones",
            slug: "wireless-headphones",
            price: "199.99",
            original_price: None,
            description: "High-quality wireless headphones with noise cancellation and \
                          premium sound.",
            category_slug: "electronics",
            sku: "HP-001",
            stock_quantity: 25,
            sizes: &[],
            colors: &["Black", "White", "Silver"],
            is_featured: true,
        },
        DemoProduct {
            name: "Classic Sneakers",
            slug: "classic-sneakers",
            price: "89.99",
            original_price: Some("119.99"),
            description: "Comfortable and stylish sneakers perfect for casual wear.",
            category_slug: "shoes",
            sku: "SNK-001",
            stock_quantity: 40,
            sizes: &["7", "8", "9", "10", "11", "12"],
            colors: &["White", "Black", "Red"],
            is_featured: false,
        },
        DemoProduct {
            name: "Leather Wallet",
            slug: "leather-wallet",
            price: "49.99",
            original_price: None,
            description: "Premium leather wallet with multiple card slots and cash \
                          compartments.",
            category_slug: "accessories",
            sku: "WLT-001",
            stock_quantity: 30,
            sizes: &[],
            colors: &["Black", "Brown", "Tan"],
            is_featured: false,
        },
    ];

    entries
        .into_iter()
        .map(|entry| {
            let category_id = categories
                .iter()
                .find(|c| c.slug.as_str() == entry.category_slug)
                .map(|c| c.id);
            Ok(Product {
                id: ProductId::generate(),
                name: entry.name.to_owned(),
                slug: Slug::parse(entry.slug)?,
                description: Some(entry.description.to_owned()),
                price: Money::parse(entry.price)?,
                original_price: entry.original_price.map(Money::parse).transpose()?,
                images: vec!["/placeholder.svg".to_owned()],
                brand: Some("LUXE".to_owned()),
                sku: Some(entry.sku.to_owned()),
                stock_quantity: entry.stock_quantity,
                sizes: entry.sizes.iter().map(|&s| s.to_owned()).collect(),
                colors: entry.colors.iter().map(|&c| c.to_owned()).collect(),
                is_active: true,
                is_featured: entry.is_featured,
                category_id,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        })
        .collect()
}
