//! `PostgreSQL` implementation of the store traits.
//!
//! Uses the runtime query API with explicit row mapping into domain types.
//! Invalid data coming back from the database surfaces as
//! `RepositoryError::DataCorruption` rather than a panic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use luxe_core::{
    LineItemId, OrderId, OrderItemId, OrderStatus, ProductId, Slug, UserId, VariantKey,
    WishlistItemId,
};

use crate::models::{
    Address, CartLineItem, Category, NewLineItem, NewOrder, Order, OrderLineItem, Product,
    ProductFilter, WishlistItem,
};

use super::{CartStore, CatalogStore, OrderStore, RepositoryError, WishlistStore};

/// Postgres-backed implementation of all store traits.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn quantity_from_row(row: &PgRow, column: &str) -> Result<u32, RepositoryError> {
    let raw: i32 = row.try_get(column)?;
    u32::try_from(raw)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {column}: {raw}")))
}

fn status_from_row(row: &PgRow) -> Result<OrderStatus, RepositoryError> {
    let raw: String = row.try_get("status")?;
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid order status: {e}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        original_price: row.try_get("original_price")?,
        images: row.try_get("images")?,
        brand: row.try_get("brand")?,
        sku: row.try_get("sku")?,
        stock_quantity: quantity_from_row(row, "stock_quantity")?,
        sizes: row.try_get("sizes")?,
        colors: row.try_get("colors")?,
        is_active: row.try_get("is_active")?,
        is_featured: row.try_get("is_featured")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn line_item_from_row(row: &PgRow) -> Result<CartLineItem, RepositoryError> {
    Ok(CartLineItem {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        product_id: row.try_get("product_id")?,
        quantity: quantity_from_row(row, "quantity")?,
        variant: VariantKey {
            size: row.try_get("size")?,
            color: row.try_get("color")?,
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn address_from_row(row: &PgRow, prefix: &str) -> Result<Address, RepositoryError> {
    let column = |name: &str| format!("{prefix}{name}");
    Ok(Address {
        first_name: row.try_get(column("first_name").as_str())?,
        last_name: row.try_get(column("last_name").as_str())?,
        company: row.try_get(column("company").as_str())?,
        address_line_1: row.try_get(column("address_line_1").as_str())?,
        address_line_2: row.try_get(column("address_line_2").as_str())?,
        city: row.try_get(column("city").as_str())?,
        state: row.try_get(column("state").as_str())?,
        postal_code: row.try_get(column("postal_code").as_str())?,
        country: row.try_get(column("country").as_str())?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, RepositoryError> {
    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        order_number: row.try_get("order_number")?,
        status: status_from_row(row)?,
        subtotal: row.try_get("subtotal")?,
        shipping_cost: row.try_get("shipping_cost")?,
        tax_amount: row.try_get("tax_amount")?,
        total_amount: row.try_get("total_amount")?,
        shipping_address: address_from_row(row, "ship_")?,
        billing_address: address_from_row(row, "bill_")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        lines: Vec::new(),
    })
}

fn order_line_from_row(row: &PgRow) -> Result<OrderLineItem, RepositoryError> {
    Ok(OrderLineItem {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        quantity: quantity_from_row(row, "quantity")?,
        unit_price: row.try_get("unit_price")?,
        variant: VariantKey {
            size: row.try_get("size")?,
            color: row.try_get("color")?,
        },
    })
}

fn wishlist_item_from_row(row: &PgRow) -> Result<WishlistItem, RepositoryError> {
    Ok(WishlistItem {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        product_id: row.try_get("product_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

const ORDER_SELECT: &str = r"
    SELECT o.id, o.user_id, o.order_number, o.status,
           o.subtotal, o.shipping_cost, o.tax_amount, o.total_amount,
           o.created_at,
           sa.first_name AS ship_first_name, sa.last_name AS ship_last_name,
           sa.company AS ship_company,
           sa.address_line_1 AS ship_address_line_1,
           sa.address_line_2 AS ship_address_line_2,
           sa.city AS ship_city, sa.state AS ship_state,
           sa.postal_code AS ship_postal_code, sa.country AS ship_country,
           ba.first_name AS bill_first_name, ba.last_name AS bill_last_name,
           ba.company AS bill_company,
           ba.address_line_1 AS bill_address_line_1,
           ba.address_line_2 AS bill_address_line_2,
           ba.city AS bill_city, ba.state AS bill_state,
           ba.postal_code AS bill_postal_code, ba.country AS bill_country
    FROM orders o
    JOIN address sa ON sa.id = o.shipping_address_id
    JOIN address ba ON ba.id = o.billing_address_id
";

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl CatalogStore for PgStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM product WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM product WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn active_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT * FROM product
            WHERE is_active
              AND ($1::uuid IS NULL OR category_id = $1)
              AND (NOT $2 OR is_featured)
              AND (NOT $3 OR (original_price IS NOT NULL AND original_price > price))
              AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')
            ORDER BY created_at DESC
            ",
        )
        .bind(filter.category)
        .bind(filter.featured_only)
        .bind(filter.on_sale_only)
        .bind(filter.query.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM category ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn insert_category(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO category (id, name, slug, description, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.description.as_deref())
        .bind(category.image_url.as_deref())
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category slug already exists"))?;
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO product (id, name, slug, description, price, original_price,
                                 images, brand, sku, stock_quantity, sizes, colors,
                                 is_active, is_featured, category_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.original_price)
        .bind(&product.images)
        .bind(product.brand.as_deref())
        .bind(product.sku.as_deref())
        .bind(i32::try_from(product.stock_quantity).unwrap_or(i32::MAX))
        .bind(&product.sizes)
        .bind(&product.colors)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product slug already exists"))?;
        Ok(())
    }

    async fn set_product_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE product SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

#[async_trait]
impl CartStore for PgStore {
    async fn upsert_line_item(&self, new: &NewLineItem) -> Result<CartLineItem, RepositoryError> {
        // The unique expression index on (user_id, product_id, size, color)
        // makes find-or-create a single atomic statement: concurrent adds
        // for the same tuple both land on the increment path.
        let row = sqlx::query(
            r"
            INSERT INTO cart_item (id, user_id, product_id, quantity, size, color)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, product_id, COALESCE(size, ''), COALESCE(color, ''))
            DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity
            RETURNING id, user_id, product_id, quantity, size, color, created_at
            ",
        )
        .bind(LineItemId::generate())
        .bind(new.user_id)
        .bind(new.product_id)
        .bind(i32::try_from(new.quantity).unwrap_or(i32::MAX))
        .bind(new.variant.size.as_deref())
        .bind(new.variant.color.as_deref())
        .fetch_one(&self.pool)
        .await?;

        line_item_from_row(&row)
    }

    async fn line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<Option<CartLineItem>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM cart_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(line_item_from_row).transpose()
    }

    async fn set_line_item_quantity(
        &self,
        user_id: UserId,
        id: LineItemId,
        quantity: u32,
    ) -> Result<CartLineItem, RepositoryError> {
        let row = sqlx::query(
            r"
            UPDATE cart_item SET quantity = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, user_id, product_id, quantity, size, color, created_at
            ",
        )
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        line_item_from_row(&row)
    }

    async fn delete_line_item(
        &self,
        user_id: UserId,
        id: LineItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_line_items(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn line_items(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM cart_item WHERE user_id = $1 ORDER BY created_at ASC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(line_item_from_row).collect()
    }

    async fn quantity_total(&self, user_id: UserId) -> Result<u32, RepositoryError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(quantity), 0)::bigint AS total FROM cart_item WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        u32::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("invalid cart total: {total}")))
    }
}

// =============================================================================
// Orders
// =============================================================================

async fn insert_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    address: &Address,
) -> Result<Uuid, RepositoryError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r"
        INSERT INTO address (id, first_name, last_name, company, address_line_1,
                             address_line_2, city, state, postal_code, country)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ",
    )
    .bind(id)
    .bind(&address.first_name)
    .bind(&address.last_name)
    .bind(address.company.as_deref())
    .bind(&address.address_line_1)
    .bind(address.address_line_2.as_deref())
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

impl PgStore {
    async fn attach_lines(&self, orders: &mut [Order]) -> Result<(), RepositoryError> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = orders.iter().map(|order| order.id.as_uuid()).collect();
        let rows = sqlx::query(
            r"
            SELECT id, order_id, product_id, product_name, quantity, unit_price, size, color
            FROM order_item
            WHERE order_id = ANY($1)
            ORDER BY position ASC
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        for row in &rows {
            let order_id: OrderId = row.try_get("order_id")?;
            let line = order_line_from_row(row)?;
            if let Some(order) = orders.iter_mut().find(|order| order.id == order_id) {
                order.lines.push(line);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn persist_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        // One transaction end to end: the cart rows are only deleted if the
        // order row and every snapshot committed, and vice versa.
        let mut tx = self.pool.begin().await?;

        let shipping_address_id = insert_address(&mut tx, &order.shipping_address).await?;
        let billing_address_id = insert_address(&mut tx, &order.billing_address).await?;

        let order_id = OrderId::generate();
        let created_at = Utc::now();
        sqlx::query(
            r"
            INSERT INTO orders (id, user_id, order_number, status, subtotal, shipping_cost,
                                tax_amount, total_amount, shipping_address_id,
                                billing_address_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(order_id)
        .bind(order.user_id)
        .bind(&order.order_number)
        .bind(order.status.to_string())
        .bind(order.subtotal)
        .bind(order.shipping_cost)
        .bind(order.tax_amount)
        .bind(order.total_amount)
        .bind(shipping_address_id)
        .bind(billing_address_id)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "order number already exists"))?;

        let mut lines = Vec::with_capacity(order.lines.len());
        for (position, line) in order.lines.iter().enumerate() {
            let id = OrderItemId::generate();
            sqlx::query(
                r"
                INSERT INTO order_item (id, order_id, product_id, product_name, quantity,
                                        unit_price, size, color, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(id)
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .bind(line.unit_price)
            .bind(line.variant.size.as_deref())
            .bind(line.variant.color.as_deref())
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;

            lines.push(OrderLineItem {
                id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                variant: line.variant.clone(),
            });
        }

        let converted: Vec<Uuid> = order
            .converted_line_items
            .iter()
            .map(|id| id.as_uuid())
            .collect();
        sqlx::query("DELETE FROM cart_item WHERE user_id = $1 AND id = ANY($2)")
            .bind(order.user_id)
            .bind(&converted)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            user_id: order.user_id,
            order_number: order.order_number.clone(),
            status: order.status,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            tax_amount: order.tax_amount,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            created_at,
            lines,
        })
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut orders = vec![order_from_row(&row)?];
        self.attach_lines(&mut orders).await?;
        Ok(orders.pop())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC");
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut orders: Vec<Order> = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<_, _>>()?;
        self.attach_lines(&mut orders).await?;
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Wishlist
// =============================================================================

#[async_trait]
impl WishlistStore for PgStore {
    async fn upsert_wishlist_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItem, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on
        // conflict, so a repeated save stays idempotent.
        let row = sqlx::query(
            r"
            INSERT INTO wishlist_item (id, user_id, product_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET user_id = wishlist_item.user_id
            RETURNING id, user_id, product_id, created_at
            ",
        )
        .bind(WishlistItemId::generate())
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        wishlist_item_from_row(&row)
    }

    async fn wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<Option<WishlistItem>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM wishlist_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(wishlist_item_from_row).transpose()
    }

    async fn delete_wishlist_item(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlist_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn wishlist_items(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM wishlist_item WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(wishlist_item_from_row).collect()
    }
}
