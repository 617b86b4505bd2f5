//! Parts catalog and warehouse stock repository

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::DatabaseError;

/// Repository for the parts catalog and per-warehouse stock
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_parts(&self) -> Result<Vec<CatalogRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT part_number, part_id, name, unit_price, currency, home_warehouse_id
            FROM parts_catalog
            ORDER BY part_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Applies a signed delta and records the movement; returns the new level
    ///
    /// The `quantity >= 0` check turns an overdraw into `ConstraintViolation`.
    /// When `reference` was already recorded nothing changes and the current
    /// level is returned.
    pub async fn adjust(
        &self,
        warehouse_id: i32,
        part_number: &str,
        delta: i64,
        reference: Option<&str>,
        correlation_id: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if let Some(reference) = reference {
            let seen = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM stock_movements WHERE reference = $1)",
            )
            .bind(reference)
            .fetch_one(&mut *tx)
            .await?;
            if seen {
                let level = sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT quantity FROM warehouse_stock
                    WHERE warehouse_id = $1 AND part_number = $2
                    "#,
                )
                .bind(warehouse_id)
                .bind(part_number)
                .fetch_optional(&mut *tx)
                .await?;
                tx.commit().await?;
                return Ok(level.unwrap_or(0));
            }
        }

        let level = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO warehouse_stock (warehouse_id, part_number, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (warehouse_id, part_number)
            DO UPDATE SET quantity = warehouse_stock.quantity + EXCLUDED.quantity
            RETURNING quantity
            "#,
        )
        .bind(warehouse_id)
        .bind(part_number)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_movements
                (warehouse_id, part_number, delta, reference, correlation_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(warehouse_id)
        .bind(part_number)
        .bind(delta)
        .bind(reference)
        .bind(correlation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(level)
    }

    pub async fn movement_recorded(&self, reference: &str) -> Result<bool, DatabaseError> {
        let seen = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM stock_movements WHERE reference = $1)",
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await?;
        Ok(seen)
    }

    pub async fn level(&self, warehouse_id: i32, part_number: &str) -> Result<i64, DatabaseError> {
        let level = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM warehouse_stock WHERE warehouse_id = $1 AND part_number = $2",
        )
        .bind(warehouse_id)
        .bind(part_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(level.unwrap_or(0))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CatalogRow {
    pub part_number: String,
    pub part_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub currency: String,
    pub home_warehouse_id: i32,
}
