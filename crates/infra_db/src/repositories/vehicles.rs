//! Vehicle repository implementation

use sqlx::{FromRow, PgPool};

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, vin: &str) -> Result<VehicleRow, DatabaseError> {
        sqlx::query_as::<_, VehicleRow>(
            "SELECT vin, model, owner_name FROM vehicles WHERE vin = $1",
        )
        .bind(vin)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Vehicle", vin))
    }

    pub async fn list(&self) -> Result<Vec<VehicleRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            "SELECT vin, model, owner_name FROM vehicles ORDER BY vin",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct VehicleRow {
    pub vin: String,
    pub model: String,
    pub owner_name: Option<String>,
}
