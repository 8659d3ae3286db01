//! Store layer: catalog, cart, orders and user profiles over SQLite.
//!
//! Every write is a single statement except order finalization, which runs
//! the order insert and the cart-line deletes in one transaction so a crash
//! can never leave a placed order with stray cart lines (or the reverse).
//! Read paths retry transient IO failures with exponential backoff and
//! jitter before giving up.

use anyhow::{Context, Result};
use rand::Rng;
use sqlx::sqlite::SqlitePool;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{CartLine, Language, Order, Product, UserProfile};

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 50;

/// Initialize the database schema.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing database schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            language_code TEXT NOT NULL DEFAULT 'LATIN',
            phone_number TEXT,
            full_name TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            min_quantity INTEGER NOT NULL DEFAULT 1
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create products table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cart_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            total_price INTEGER NOT NULL,
            total_count INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create cart_lines table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            total_price INTEGER NOT NULL,
            location TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create orders table")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Retry a single store operation on transient IO failure with exponential
/// backoff plus random jitter. Anything non-transient propagates at once.
async fn with_retry<T, F, Fut>(op_name: &str, op: F) -> Result<T, sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < RETRY_ATTEMPTS && is_transient(&e) => {
                attempt += 1;
                let jitter = rand::thread_rng().gen_range(0..RETRY_BASE_DELAY_MS / 2);
                warn!(
                    operation = op_name,
                    attempt,
                    error = %e,
                    "Transient store failure, retrying"
                );
                tokio::time::sleep(delay + Duration::from_millis(jitter)).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Highest-level handle to the stores, shared by all handlers.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---- catalog ----

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let pool = self.pool.clone();
        with_retry("list_products", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, Product>(
                    "SELECT id, name, price, min_quantity FROM products ORDER BY id",
                )
                .fetch_all(&pool)
                .await
            }
        })
        .await
        .context("Failed to list products")
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let pool = self.pool.clone();
        with_retry("get_product", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, Product>(
                    "SELECT id, name, price, min_quantity FROM products WHERE id = ?",
                )
                .bind(id)
                .fetch_optional(&pool)
                .await
            }
        })
        .await
        .context("Failed to read product")
    }

    pub async fn add_product(&self, name: &str, price: i64, min_quantity: i64) -> Result<i64> {
        let result = sqlx::query("INSERT INTO products (name, price, min_quantity) VALUES (?, ?, ?)")
            .bind(name)
            .bind(price)
            .bind(min_quantity)
            .execute(&self.pool)
            .await
            .context("Failed to insert product")?;
        Ok(result.last_insert_rowid())
    }

    // ---- cart ----

    pub async fn add_cart_line(
        &self,
        user_id: i64,
        product_id: i64,
        total_price: i64,
        total_count: i64,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO cart_lines (user_id, product_id, total_price, total_count)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(total_price)
        .bind(total_count)
        .execute(&self.pool)
        .await
        .context("Failed to insert cart line")?;

        let id = result.last_insert_rowid();
        info!(user_id, product_id, total_count, cart_line_id = id, "Cart line created");
        Ok(id)
    }

    pub async fn cart_lines_by_user(&self, user_id: i64) -> Result<Vec<CartLine>> {
        let pool = self.pool.clone();
        with_retry("cart_lines_by_user", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, CartLine>(
                    "SELECT id, user_id, product_id, total_price, total_count
                     FROM cart_lines WHERE user_id = ? ORDER BY id",
                )
                .bind(user_id)
                .fetch_all(&pool)
                .await
            }
        })
        .await
        .context("Failed to list cart lines")
    }

    pub async fn delete_cart_line(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete cart line")?;
        Ok(result.rows_affected() > 0)
    }

    // ---- orders ----

    /// Finalize a checkout: insert the order and delete exactly the cart
    /// lines the summary was computed from, in one transaction.
    pub async fn place_order(
        &self,
        user_id: i64,
        total_price: i64,
        location: &str,
        consumed_line_ids: &[i64],
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query(
            "INSERT INTO orders (user_id, total_price, location) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(total_price)
        .bind(location)
        .execute(&mut *tx)
        .await
        .context("Failed to insert order")?;
        let order_id = result.last_insert_rowid();

        for line_id in consumed_line_ids {
            sqlx::query("DELETE FROM cart_lines WHERE id = ?")
                .bind(line_id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete consumed cart line")?;
        }

        tx.commit().await.context("Failed to commit order")?;

        info!(
            user_id,
            order_id,
            total_price,
            lines = consumed_line_ids.len(),
            "Order placed"
        );
        Ok(order_id)
    }

    pub async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let pool = self.pool.clone();
        with_retry("orders_by_user", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, Order>(
                    "SELECT id, user_id, total_price, location, created_at
                     FROM orders WHERE user_id = ? ORDER BY id",
                )
                .bind(user_id)
                .fetch_all(&pool)
                .await
            }
        })
        .await
        .context("Failed to list orders")
    }

    // ---- profiles ----

    pub async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let pool = self.pool.clone();
        with_retry("get_profile", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, UserProfile>(
                    "SELECT user_id, language_code, phone_number, full_name
                     FROM users WHERE user_id = ?",
                )
                .bind(user_id)
                .fetch_optional(&pool)
                .await
            }
        })
        .await
        .context("Failed to read profile")
    }

    /// Create the profile row on first contact; existing rows are untouched.
    pub async fn upsert_profile(&self, user_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO users (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to upsert profile")?;
        Ok(())
    }

    pub async fn update_language(&self, user_id: i64, lang: Language) -> Result<()> {
        sqlx::query("UPDATE users SET language_code = ? WHERE user_id = ?")
            .bind(lang.as_code())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to update language")?;
        Ok(())
    }

    pub async fn update_phone(&self, user_id: i64, phone: &str) -> Result<()> {
        sqlx::query("UPDATE users SET phone_number = ? WHERE user_id = ?")
            .bind(phone)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to update phone number")?;
        Ok(())
    }

    pub async fn update_full_name(&self, user_id: i64, full_name: &str) -> Result<()> {
        sqlx::query("UPDATE users SET full_name = ? WHERE user_id = ?")
            .bind(full_name)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to update full name")?;
        Ok(())
    }
}
