//! Claims repository implementation
//!
//! Claims, their status timeline, linked campaigns, comments, and the
//! per-(center, day) sequence counter.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for warranty claims
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a claim with its initial timeline entry
    ///
    /// A second claim under the same id fails with `DuplicateEntry`.
    pub async fn insert(
        &self,
        claim: &ClaimRow,
        timeline: &[TimelineRow],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id, center_id, claim_date, seq, vin,
                created_by, assigned_technician, status, description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&claim.claim_id)
        .bind(claim.center_id)
        .bind(claim.claim_date)
        .bind(claim.seq)
        .bind(&claim.vin)
        .bind(claim.created_by)
        .bind(claim.assigned_technician)
        .bind(&claim.status)
        .bind(&claim.description)
        .execute(&mut *tx)
        .await?;

        for entry in timeline {
            sqlx::query(
                r#"
                INSERT INTO claim_timeline (claim_id, position, status, at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&claim.claim_id)
            .bind(entry.position)
            .bind(&entry.status)
            .bind(entry.at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads a claim with its timeline and campaign links
    pub async fn get(&self, claim_id: &str) -> Result<ClaimRecord, DatabaseError> {
        let claim = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_id, center_id, claim_date, seq, vin,
                   created_by, assigned_technician, status, description
            FROM claims
            WHERE claim_id = $1
            "#,
        )
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))?;

        self.hydrate(claim).await
    }

    /// Lists claims matching the optional filters, newest first
    pub async fn list(
        &self,
        center_id: Option<i32>,
        status: Option<&str>,
        vin: Option<&str>,
    ) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT claim_id, center_id, claim_date, seq, vin,
                   created_by, assigned_technician, status, description
            FROM claims
            WHERE TRUE
            "#,
        );
        if let Some(center_id) = center_id {
            query.push(" AND center_id = ").push_bind(center_id);
        }
        if let Some(status) = status {
            query.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(vin) = vin {
            query.push(" AND vin = ").push_bind(vin.to_string());
        }
        query.push(" ORDER BY claim_date DESC, center_id, seq DESC");

        let rows = query.build_query_as::<ClaimRow>().fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.hydrate(row).await?);
        }
        Ok(records)
    }

    async fn hydrate(&self, claim: ClaimRow) -> Result<ClaimRecord, DatabaseError> {
        let timeline = sqlx::query_as::<_, TimelineRow>(
            r#"
            SELECT position, status, at
            FROM claim_timeline
            WHERE claim_id = $1
            ORDER BY position
            "#,
        )
        .bind(&claim.claim_id)
        .fetch_all(&self.pool)
        .await?;

        let campaign_ids = sqlx::query_scalar::<_, i64>(
            "SELECT campaign_id FROM claim_campaigns WHERE claim_id = $1 ORDER BY campaign_id",
        )
        .bind(&claim.claim_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ClaimRecord {
            claim,
            timeline,
            campaign_ids,
        })
    }

    /// Allocates the next sequence for a (center, day) in one statement
    ///
    /// The first allocation of a day starts after the claims already stored
    /// under that prefix.
    pub async fn next_sequence(
        &self,
        center_id: i32,
        claim_date: NaiveDate,
    ) -> Result<i32, DatabaseError> {
        let seq = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO claim_sequences (center_id, claim_date, last_seq)
            VALUES (
                $1, $2,
                (SELECT COUNT(*)::INTEGER FROM claims WHERE center_id = $1 AND claim_date = $2) + 1
            )
            ON CONFLICT (center_id, claim_date)
            DO UPDATE SET last_seq = claim_sequences.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(center_id)
        .bind(claim_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(seq)
    }

    /// Compare-and-set status change plus its timeline entry
    ///
    /// Fails with `StaleState` when the claim is no longer in `expected`.
    pub async fn transition(
        &self,
        claim_id: &str,
        expected: &str,
        status: &str,
        at: DateTime<Utc>,
    ) -> Result<ClaimRecord, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let updated =
            sqlx::query("UPDATE claims SET status = $3 WHERE claim_id = $1 AND status = $2")
                .bind(claim_id)
                .bind(expected)
                .bind(status)
                .execute(&mut *tx)
                .await?;

        if updated.rows_affected() == 0 {
            let current =
                sqlx::query_scalar::<_, String>("SELECT status FROM claims WHERE claim_id = $1")
                    .bind(claim_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match current {
                None => DatabaseError::not_found("Claim", claim_id),
                Some(current) => DatabaseError::StaleState(format!(
                    "claim {} is {}, expected {}",
                    claim_id, current, expected
                )),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO claim_timeline (claim_id, position, status, at)
            SELECT $1, COALESCE(MAX(position), 0) + 1, $2, $3
            FROM claim_timeline
            WHERE claim_id = $1
            "#,
        )
        .bind(claim_id)
        .bind(status)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(claim_id).await
    }

    pub async fn add_campaign(
        &self,
        claim_id: &str,
        campaign_id: i64,
    ) -> Result<(), DatabaseError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO claim_campaigns (claim_id, campaign_id)
            SELECT claim_id, $2 FROM claims WHERE claim_id = $1
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(claim_id)
        .bind(campaign_id)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM claims WHERE claim_id = $1)",
            )
            .bind(claim_id)
            .fetch_one(&self.pool)
            .await?;
            if !exists {
                return Err(DatabaseError::not_found("Claim", claim_id));
            }
        }
        Ok(())
    }

    pub async fn insert_comment(&self, comment: &CommentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claim_comments (comment_id, claim_id, author_id, body, posted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.comment_id)
        .bind(&comment.claim_id)
        .bind(comment.author_id)
        .bind(&comment.body)
        .bind(comment.posted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn comments(&self, claim_id: &str) -> Result<Vec<CommentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT comment_id, claim_id, author_id, body, posted_at
            FROM claim_comments
            WHERE claim_id = $1
            ORDER BY posted_at, comment_id
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub claim_id: String,
    pub center_id: i32,
    pub claim_date: NaiveDate,
    pub seq: i32,
    pub vin: String,
    pub created_by: i64,
    pub assigned_technician: Option<i64>,
    pub status: String,
    pub description: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TimelineRow {
    pub position: i32,
    pub status: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub comment_id: Uuid,
    pub claim_id: String,
    pub author_id: i64,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

/// A claim row with its child rows
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub claim: ClaimRow,
    pub timeline: Vec<TimelineRow>,
    pub campaign_ids: Vec<i64>,
}
