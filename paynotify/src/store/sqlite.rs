//! SQLite-backed order store.
//!
//! Every status write is a single `UPDATE ... WHERE` statement, so the
//! compare-and-swap holds even when several server processes share one
//! database file.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use super::{OrderStore, StoreError};
use crate::order::{Order, OrderStatus};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        order_id   TEXT PRIMARY KEY NOT NULL,
        status     TEXT NOT NULL DEFAULT 'PENDING',
        version    INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    );
"#;

/// Orders persisted in a SQLite database shared by every server process.
#[derive(Debug, Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Connect to `url`, creating the database file and `orders` table if needed.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        info!(max_connections = max_connections, "sqlite_order_store_ready");
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn find_by_external_id(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let order = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        expected_current: Option<OrderStatus>,
    ) -> Result<Order, StoreError> {
        let now = OffsetDateTime::now_utc();
        // RETURNING statements are drained with `fetch_all` so SQLite steps them
        // to completion and commits before the result is handed back.
        let updated: Vec<Order> = match expected_current {
            Some(expected) => {
                sqlx::query_as(
                    r#"
                        UPDATE orders
                        SET status = $1, version = version + 1, updated_at = $2
                        WHERE order_id = $3 AND status = $4
                        RETURNING *;
                    "#,
                )
                .bind(new_status)
                .bind(now)
                .bind(order_id)
                .bind(expected)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                        UPDATE orders
                        SET status = $1, version = version + 1, updated_at = $2
                        WHERE order_id = $3
                        RETURNING *;
                    "#,
                )
                .bind(new_status)
                .bind(now)
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        if let Some(order) = updated.into_iter().next() {
            return Ok(order);
        }

        // Nothing matched: either the order is gone or the status moved on.
        match self.find_by_external_id(order_id).await? {
            Some(current) => Err(StoreError::Conflict { current }),
            None => Err(StoreError::NotFound(order_id.to_string())),
        }
    }

    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let inserted: Vec<Order> = sqlx::query_as(
            r#"
                INSERT INTO orders (order_id, status, version, updated_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (order_id) DO NOTHING
                RETURNING *;
            "#,
        )
        .bind(&order.order_id)
        .bind(order.status)
        .bind(order.version)
        .bind(order.updated_at)
        .fetch_all(&self.pool)
        .await?;

        inserted
            .into_iter()
            .next()
            .ok_or(StoreError::Duplicate(order.order_id))
    }
}
