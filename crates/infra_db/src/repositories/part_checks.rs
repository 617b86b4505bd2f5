//! Part check repository implementation

use sqlx::{FromRow, PgPool};

use crate::error::DatabaseError;

/// Repository for technician part checks
#[derive(Debug, Clone)]
pub struct PartCheckRepository {
    pool: PgPool,
}

impl PartCheckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts checks in order after any already recorded for the claim
    ///
    /// All rows land or none do; a repeated part number fails with `DuplicateEntry`.
    pub async fn insert_many(&self, checks: &[PartCheckRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        for check in checks {
            sqlx::query(
                r#"
                INSERT INTO part_checks (
                    claim_id, part_number, part_id, quantity,
                    is_repair, approved, rejected, position
                )
                SELECT $1, $2, $3, $4, $5, $6, $7, COALESCE(MAX(position), 0) + 1
                FROM part_checks
                WHERE claim_id = $1
                "#,
            )
            .bind(&check.claim_id)
            .bind(&check.part_number)
            .bind(check.part_id)
            .bind(check.quantity)
            .bind(check.is_repair)
            .bind(check.approved)
            .bind(check.rejected)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn by_claim(&self, claim_id: &str) -> Result<Vec<PartCheckRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PartCheckRow>(
            r#"
            SELECT claim_id, part_number, part_id, quantity, is_repair, approved, rejected
            FROM part_checks
            WHERE claim_id = $1
            ORDER BY position
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Overwrites quantity, repair flag, and part id of one check
    pub async fn update(
        &self,
        claim_id: &str,
        part_number: &str,
        quantity: i32,
        is_repair: bool,
        part_id: i64,
    ) -> Result<PartCheckRow, DatabaseError> {
        sqlx::query_as::<_, PartCheckRow>(
            r#"
            UPDATE part_checks
            SET quantity = $3, is_repair = $4, part_id = $5
            WHERE claim_id = $1 AND part_number = $2
            RETURNING claim_id, part_number, part_id, quantity, is_repair, approved, rejected
            "#,
        )
        .bind(claim_id)
        .bind(part_number)
        .bind(quantity)
        .bind(is_repair)
        .bind(part_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            DatabaseError::not_found("PartCheck", format!("{}/{}", claim_id, part_number))
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PartCheckRow {
    pub claim_id: String,
    pub part_number: String,
    pub part_id: i64,
    pub quantity: i32,
    pub is_repair: bool,
    pub approved: bool,
    pub rejected: bool,
}
