use std::collections::BTreeSet;

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use tracing::warn;

use crate::error::AppError;
use crate::models::sale::{NewSaleItem, Sale, SaleItem};
use crate::repository::item::ItemRepository;

const SALE_COLUMNS: &str = "id, user_id, total_amount, created_at, updated_at, deleted_at";
const SALE_ITEM_COLUMNS: &str = "id, sale_id, item_id, quantity, price_at_sale, subtotal";

/// Persists sale headers and lines together with their stock effects.
///
/// Every mutation is a single transaction over `sales`, `sale_items` and `items`.
/// An early `?` drops the transaction, which rolls it back.
#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
    items: ItemRepository,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        let items = ItemRepository::new(pool.clone());
        Self { pool, items }
    }

    pub async fn create(&self, user_id: i64, total_amount: Decimal, lines: &[NewSaleItem]) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let wanted = item_ids(lines.iter().map(|l| l.item_id));
        self.lock_items(&mut tx, &wanted, &wanted).await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "INSERT INTO sales (user_id, total_amount) VALUES ($1, $2) RETURNING {SALE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        self.apply_lines(&mut tx, sale.id, lines).await?;

        tx.commit().await?;
        Ok(sale)
    }

    /// Replaces every line of an active sale: restores the old stock, then applies the new lines.
    pub async fn update(&self, sale_id: i64, total_amount: Decimal, lines: &[NewSaleItem]) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        lock_active_sale(&mut tx, sale_id).await?;
        let current = self.find_sale_items(&mut *tx, sale_id).await?;

        let wanted = item_ids(lines.iter().map(|l| l.item_id));
        let touched = item_ids(current.iter().map(|l| l.item_id).chain(wanted.iter().copied()));
        self.lock_items(&mut tx, &touched, &wanted).await?;

        self.restore_stock(&mut tx, &current).await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "UPDATE sales SET total_amount = $1, updated_at = NOW()
             WHERE id = $2 AND deleted_at IS NULL RETURNING {SALE_COLUMNS}"
        ))
        .bind(total_amount)
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("sale not found"))?;

        self.apply_lines(&mut tx, sale_id, lines).await?;

        tx.commit().await?;
        Ok(sale)
    }

    /// Soft-deletes an active sale after giving its stock back.
    pub async fn delete(&self, sale_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        lock_active_sale(&mut tx, sale_id).await?;
        let current = self.find_sale_items(&mut *tx, sale_id).await?;

        let touched = item_ids(current.iter().map(|l| l.item_id));
        self.items.lock_for_update(&mut *tx, &touched).await?;

        self.restore_stock(&mut tx, &current).await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE sales SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("sale not found"));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, sale_id: i64) -> Result<Option<Sale>, sqlx::Error> {
        sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_sale_items<'e, E>(&self, executor: E, sale_id: i64) -> Result<Vec<SaleItem>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = $1 ORDER BY id"
        ))
        .bind(sale_id)
        .fetch_all(executor)
        .await
    }

    /// Active sales, newest first.
    pub async fn find_all(&self, limit: i64, offset: i64) -> Result<(Vec<Sale>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((sales, total))
    }

    /// Locks `touched` item rows in id order; every id in `required` must exist.
    async fn lock_items(&self, conn: &mut PgConnection, touched: &[i64], required: &[i64]) -> Result<(), AppError> {
        let locked = self.items.lock_for_update(&mut *conn, touched).await?;
        if let Some(missing) = required.iter().find(|id| !locked.contains(*id)) {
            return Err(AppError::not_found(format!("item {missing} not found")));
        }
        Ok(())
    }

    async fn restore_stock(&self, conn: &mut PgConnection, lines: &[SaleItem]) -> Result<(), AppError> {
        for line in lines {
            self.items.increment_stock(&mut *conn, line.item_id, line.quantity).await?;
        }
        Ok(())
    }

    async fn apply_lines(&self, conn: &mut PgConnection, sale_id: i64, lines: &[NewSaleItem]) -> Result<(), AppError> {
        for line in lines {
            sqlx::query(
                "INSERT INTO sale_items (sale_id, item_id, quantity, price_at_sale, subtotal)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(sale_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.price_at_sale)
            .bind(line.subtotal)
            .execute(&mut *conn)
            .await?;

            let updated = self
                .items
                .decrement_stock_if_available(&mut *conn, line.item_id, line.quantity)
                .await?;

            if updated == 0 {
                let label = match self.items.find_by_id(&mut *conn, line.item_id).await? {
                    Some(item) => item.label(),
                    None => format!("item {}", line.item_id),
                };
                warn!(sale_id, item_id = line.item_id, quantity = line.quantity, "stock decrement rejected");
                return Err(AppError::insufficient_stock(label));
            }
        }
        Ok(())
    }
}

async fn lock_active_sale(conn: &mut PgConnection, sale_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM sales WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
        .bind(sale_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::not_found("sale not found"))?;
    Ok(())
}

/// Distinct ids in ascending order, which is also the row-lock order.
fn item_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}
