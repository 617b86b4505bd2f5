//! Campaign, appointment, and campaign report repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<CampaignRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT campaign_id, name, models, description, start_date, end_date
            FROM campaigns
            ORDER BY campaign_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, campaign_id: i64) -> Result<CampaignRow, DatabaseError> {
        sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT campaign_id, name, models, description, start_date, end_date
            FROM campaigns
            WHERE campaign_id = $1
            "#,
        )
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Campaign", campaign_id))
    }

    /// Draws the next id from `campaign_id_seq`
    pub async fn next_id(&self) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT nextval('campaign_id_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn upsert(&self, campaign: &CampaignRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (campaign_id, name, models, description, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (campaign_id) DO UPDATE SET
                name = EXCLUDED.name,
                models = EXCLUDED.models,
                description = EXCLUDED.description,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date
            "#,
        )
        .bind(campaign.campaign_id)
        .bind(&campaign.name)
        .bind(&campaign.models)
        .bind(&campaign.description)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_appointment(
        &self,
        appointment: &AppointmentRow,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO appointments (appointment_id, vin, campaign_id, date, description, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(appointment.appointment_id)
        .bind(&appointment.vin)
        .bind(appointment.campaign_id)
        .bind(appointment.date)
        .bind(&appointment.description)
        .bind(&appointment.status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn appointments(&self) -> Result<Vec<AppointmentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            r#"
            SELECT appointment_id, vin, campaign_id, date, description, status
            FROM appointments
            ORDER BY date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_report(
        &self,
        campaign_id: i64,
        center_id: i32,
    ) -> Result<Option<ReportRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT report_id, campaign_id, center_id, submitted_by,
                   original_file_name, file_ref, submitted_at
            FROM campaign_reports
            WHERE campaign_id = $1 AND center_id = $2
            "#,
        )
        .bind(campaign_id)
        .bind(center_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts a report; the (campaign, center) key rejects a second one
    pub async fn insert_report(&self, report: &ReportRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_reports (
                report_id, campaign_id, center_id, submitted_by,
                original_file_name, file_ref, submitted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(report.report_id)
        .bind(report.campaign_id)
        .bind(report.center_id)
        .bind(&report.submitted_by)
        .bind(&report.original_file_name)
        .bind(&report.file_ref)
        .bind(report.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct CampaignRow {
    pub campaign_id: i64,
    pub name: String,
    pub models: Vec<String>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRow {
    pub appointment_id: Uuid,
    pub vin: String,
    pub campaign_id: i64,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub report_id: Uuid,
    pub campaign_id: i64,
    pub center_id: i32,
    pub submitted_by: Vec<i64>,
    pub original_file_name: String,
    pub file_ref: String,
    pub submitted_at: DateTime<Utc>,
}
