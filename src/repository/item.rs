use sqlx::{Executor, PgPool, Postgres};

use crate::models::item::Item;

const ITEM_COLUMNS: &str =
    "id, sku, name, category_id, rack_id, stock, minimum_stock, price, created_at, updated_at";

/// Item reads and stock mutation. The stock operations take any executor so the
/// sale store can run them on its open transaction.
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Item>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_ids<'e, E>(&self, executor: E, ids: &[i64]) -> Result<Vec<Item>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_sku<'e, E>(&self, executor: E, sku: &str) -> Result<Option<Item>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE sku = $1"))
            .bind(sku)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_all(&self, limit: i64, offset: i64) -> Result<(Vec<Item>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY name ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    /// Items whose stock is strictly below their minimum, scarcest first.
    pub async fn find_low_stock(&self, limit: i64, offset: i64) -> Result<(Vec<Item>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE stock < minimum_stock")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE stock < minimum_stock
             ORDER BY stock ASC, name ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    /// Row-locks the given items in ascending id order and returns the ids that exist.
    pub async fn lock_for_update<'e, E>(&self, executor: E, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar("SELECT id FROM items WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// Guarded decrement. Returns 0 when the item is missing or holds less than `quantity`.
    pub async fn decrement_stock_if_available<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        quantity: i32,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE items SET stock = stock - $1, updated_at = NOW() WHERE id = $2 AND stock >= $1",
        )
        .bind(quantity)
        .bind(item_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn increment_stock<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        quantity: i32,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE items SET stock = stock + $1, updated_at = NOW() WHERE id = $2")
            .bind(quantity)
            .bind(item_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
