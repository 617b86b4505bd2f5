//! PostgreSQL Warranty Adapter
//!
//! Implements every warranty port on top of the repositories in
//! [`crate::repositories`].
//!
//! # Overview
//!
//! The `PostgresWarrantyAdapter` is the bridge between the domain's ports and
//! the database. It:
//!
//! - Translates domain values into row types and back
//! - Checks that stored values still fit the domain types
//! - Converts `DatabaseError` into `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresWarrantyAdapter;
//! use domain_warranty::WarrantyPorts;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresWarrantyAdapter::new(pool));
//! let ports = WarrantyPorts::from_adapter(adapter);
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, AppointmentId, CampaignId, CenterId, CommentId, Currency, DomainPort,
    HealthCheckResult, HealthCheckable, Money, OperationMetadata, PartId, PartNumber, PortError,
    ReportId, StaffId, Vin, WarehouseId,
};
use domain_warranty::{
    Appointment, AppointmentPort, AppointmentStatus, Campaign, CampaignPort, CampaignReport,
    CatalogPort, Claim, ClaimComment, ClaimIdentity, ClaimPort, ClaimQuery, ClaimStatus,
    InventoryPort, PartCatalogEntry, PartCheck, PartCheckPort, PartCheckUpdate, ReportPort,
    StockDelta, TimelineEntry, Vehicle, VehiclePort,
};

use crate::repositories::campaigns::{AppointmentRow, CampaignRow, ReportRow};
use crate::repositories::claims::{ClaimRecord, ClaimRow, CommentRow, TimelineRow};
use crate::repositories::inventory::CatalogRow;
use crate::repositories::part_checks::PartCheckRow;
use crate::repositories::vehicles::VehicleRow;
use crate::repositories::{
    CampaignRepository, ClaimsRepository, InventoryRepository, PartCheckRepository,
    VehicleRepository,
};

const ADAPTER_ID: &str = "postgres-warranty-adapter";

/// PostgreSQL-backed implementation of every warranty port
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - unique/check violations and stale compare-and-set -> `PortError::Conflict`
/// - connection failures -> `PortError::Connection` (transient)
/// - Other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresWarrantyAdapter {
    claims: ClaimsRepository,
    part_checks: PartCheckRepository,
    inventory: InventoryRepository,
    campaigns: CampaignRepository,
    vehicles: VehicleRepository,
    pool: PgPool,
}

impl PostgresWarrantyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            claims: ClaimsRepository::new(pool.clone()),
            part_checks: PartCheckRepository::new(pool.clone()),
            inventory: InventoryRepository::new(pool.clone()),
            campaigns: CampaignRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresWarrantyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresWarrantyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ClaimPort for PostgresWarrantyAdapter {
    #[instrument(skip(self, claim, _metadata), fields(claim_id = %claim.id))]
    async fn create_claim(
        &self,
        claim: &Claim,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let (row, timeline) = claim_to_rows(claim)?;
        self.claims.insert(&row, &timeline).await?;
        for campaign_id in &claim.campaign_ids {
            self.claims
                .add_campaign(&row.claim_id, to_i64(campaign_id.get(), "campaign_id")?)
                .await?;
        }
        debug!("Claim stored");
        Ok(())
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimIdentity) -> Result<Claim, PortError> {
        let record = self.claims.get(&id.to_string()).await?;
        record_to_claim(record)
    }

    #[instrument(skip(self))]
    async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError> {
        let center_id = query.center_id.map(|c| to_i32(c.get(), "center_id")).transpose()?;
        let vin = query.vin.as_ref().map(|v| v.as_str().to_string());
        let records = self
            .claims
            .list(center_id, query.status.map(|s| s.as_str()), vin.as_deref())
            .await?;
        records.into_iter().map(record_to_claim).collect()
    }

    #[instrument(skip(self), fields(center_id = %center_id, %date))]
    async fn next_claim_sequence(
        &self,
        center_id: CenterId,
        date: NaiveDate,
    ) -> Result<u32, PortError> {
        let seq = self
            .claims
            .next_sequence(to_i32(center_id.get(), "center_id")?, date)
            .await?;
        from_i32(seq, "seq")
    }

    #[instrument(
        skip(self, _metadata),
        fields(claim_id = %id, from = %expected, to = %entry.status)
    )]
    async fn transition_claim(
        &self,
        id: ClaimIdentity,
        expected: ClaimStatus,
        entry: TimelineEntry,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        if !expected.can_transition_to(entry.status) {
            return Err(PortError::validation_field(
                format!("{} cannot follow {}", entry.status, expected),
                "status",
            ));
        }
        let record = self
            .claims
            .transition(&id.to_string(), expected.as_str(), entry.status.as_str(), entry.at)
            .await?;
        record_to_claim(record)
    }

    #[instrument(skip(self, _metadata), fields(claim_id = %id, campaign_id = %campaign_id))]
    async fn add_campaign(
        &self,
        id: ClaimIdentity,
        campaign_id: CampaignId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.claims
            .add_campaign(&id.to_string(), to_i64(campaign_id.get(), "campaign_id")?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, comment, _metadata), fields(claim_id = %comment.claim_id))]
    async fn post_comment(
        &self,
        comment: &ClaimComment,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let row = CommentRow {
            comment_id: *comment.id.as_uuid(),
            claim_id: comment.claim_id.to_string(),
            author_id: to_i64(comment.author_id.get(), "author_id")?,
            body: comment.body.clone(),
            posted_at: comment.posted_at,
        };
        self.claims.insert_comment(&row).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn list_comments(&self, id: ClaimIdentity) -> Result<Vec<ClaimComment>, PortError> {
        let rows = self.claims.comments(&id.to_string()).await?;
        rows.into_iter()
            .map(|row| {
                Ok(ClaimComment {
                    id: CommentId::from_uuid(row.comment_id),
                    claim_id: parse_claim_id(&row.claim_id)?,
                    author_id: StaffId::new(from_i64(row.author_id, "author_id")?),
                    body: row.body,
                    posted_at: row.posted_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PartCheckPort for PostgresWarrantyAdapter {
    #[instrument(skip(self, checks, _metadata), fields(count = checks.len()))]
    async fn record_part_checks(
        &self,
        checks: &[PartCheck],
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let rows = checks
            .iter()
            .map(|check| {
                Ok(PartCheckRow {
                    claim_id: check.claim_id.to_string(),
                    part_number: check.part_number.as_str().to_string(),
                    part_id: to_i64(check.part_id.get(), "part_id")?,
                    quantity: to_i32(check.quantity, "quantity")?,
                    is_repair: check.is_repair,
                    approved: check.approved,
                    rejected: check.rejected,
                })
            })
            .collect::<Result<Vec<_>, PortError>>()?;
        self.part_checks.insert_many(&rows).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(claim_id = %claim_id))]
    async fn search_by_claim(&self, claim_id: ClaimIdentity) -> Result<Vec<PartCheck>, PortError> {
        let rows = self.part_checks.by_claim(&claim_id.to_string()).await?;
        rows.into_iter().map(row_to_part_check).collect()
    }

    #[instrument(
        skip(self, update, _metadata),
        fields(claim_id = %claim_id, part_number = %part_number, is_repair = update.is_repair)
    )]
    async fn update_part_check(
        &self,
        claim_id: ClaimIdentity,
        part_number: &PartNumber,
        update: &PartCheckUpdate,
        _metadata: Option<OperationMetadata>,
    ) -> Result<PartCheck, PortError> {
        if update.warranty_id != claim_id.to_string() {
            return Err(PortError::validation_field(
                format!("warrantyId {} does not match claim {}", update.warranty_id, claim_id),
                "warrantyId",
            ));
        }
        let row = self
            .part_checks
            .update(
                &claim_id.to_string(),
                part_number.as_str(),
                to_i32(update.quantity, "quantity")?,
                update.is_repair,
                to_i64(update.part_id.get(), "part_id")?,
            )
            .await?;
        row_to_part_check(row)
    }
}

#[async_trait]
impl CatalogPort for PostgresWarrantyAdapter {
    #[instrument(skip(self))]
    async fn list_parts(&self) -> Result<Vec<PartCatalogEntry>, PortError> {
        let rows = self.inventory.list_parts().await?;
        rows.into_iter().map(row_to_catalog_entry).collect()
    }
}

#[async_trait]
impl InventoryPort for PostgresWarrantyAdapter {
    #[instrument(
        skip(self, metadata),
        fields(
            warehouse_id = %delta.warehouse_id,
            part_number = %delta.part_number,
            delta = delta.delta
        )
    )]
    async fn adjust_stock(
        &self,
        delta: &StockDelta,
        metadata: Option<OperationMetadata>,
    ) -> Result<i64, PortError> {
        let correlation_id = metadata.and_then(|m| m.correlation_id);
        let level = self
            .inventory
            .adjust(
                to_i32(delta.warehouse_id.get(), "warehouse_id")?,
                delta.part_number.as_str(),
                delta.delta,
                delta.reference.as_deref(),
                correlation_id.as_deref(),
            )
            .await?;
        debug!(level, "Stock adjusted");
        Ok(level)
    }

    async fn movement_recorded(&self, reference: &str) -> Result<bool, PortError> {
        Ok(self.inventory.movement_recorded(reference).await?)
    }

    async fn stock_level(
        &self,
        warehouse_id: WarehouseId,
        part_number: &PartNumber,
    ) -> Result<i64, PortError> {
        Ok(self
            .inventory
            .level(to_i32(warehouse_id.get(), "warehouse_id")?, part_number.as_str())
            .await?)
    }
}

#[async_trait]
impl VehiclePort for PostgresWarrantyAdapter {
    #[instrument(skip(self), fields(vin = %vin))]
    async fn get_vehicle(&self, vin: &Vin) -> Result<Vehicle, PortError> {
        Ok(row_to_vehicle(self.vehicles.get(vin.as_str()).await?))
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, PortError> {
        Ok(self.vehicles.list().await?.into_iter().map(row_to_vehicle).collect())
    }
}

#[async_trait]
impl CampaignPort for PostgresWarrantyAdapter {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, PortError> {
        self.campaigns.list().await?.into_iter().map(row_to_campaign).collect()
    }

    #[instrument(skip(self), fields(campaign_id = %id))]
    async fn get_campaign(&self, id: CampaignId) -> Result<Campaign, PortError> {
        row_to_campaign(self.campaigns.get(to_i64(id.get(), "campaign_id")?).await?)
    }

    async fn next_campaign_id(&self) -> Result<CampaignId, PortError> {
        let id = self.campaigns.next_id().await?;
        Ok(CampaignId::new(from_i64(id, "campaign_id")?))
    }

    #[instrument(skip(self, campaign, _metadata), fields(campaign_id = %campaign.id))]
    async fn save_campaign(
        &self,
        campaign: &Campaign,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let row = CampaignRow {
            campaign_id: to_i64(campaign.id.get(), "campaign_id")?,
            name: campaign.name.clone(),
            models: campaign.models.iter().cloned().collect(),
            description: campaign.description.clone(),
            start_date: campaign.start_date,
            end_date: campaign.end_date,
        };
        self.campaigns.upsert(&row).await?;
        Ok(())
    }
}

#[async_trait]
impl AppointmentPort for PostgresWarrantyAdapter {
    #[instrument(skip(self, appointment, _metadata), fields(appointment_id = %appointment.id))]
    async fn create_appointment(
        &self,
        appointment: &Appointment,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let row = AppointmentRow {
            appointment_id: *appointment.id.as_uuid(),
            vin: appointment.vin.as_str().to_string(),
            campaign_id: to_i64(appointment.campaign_id.get(), "campaign_id")?,
            date: appointment.date,
            description: appointment.description.clone(),
            status: appointment_status_to_db(appointment.status).to_string(),
        };
        self.campaigns.insert_appointment(&row).await?;
        Ok(())
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, PortError> {
        self.campaigns
            .appointments()
            .await?
            .into_iter()
            .map(|row| {
                Ok(Appointment {
                    id: AppointmentId::from_uuid(row.appointment_id),
                    vin: Vin::new(row.vin),
                    campaign_id: CampaignId::new(from_i64(row.campaign_id, "campaign_id")?),
                    date: row.date,
                    description: row.description,
                    status: appointment_status_from_db(&row.status)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ReportPort for PostgresWarrantyAdapter {
    #[instrument(skip(self), fields(campaign_id = %campaign_id, center_id = %center_id))]
    async fn find_report(
        &self,
        campaign_id: CampaignId,
        center_id: CenterId,
    ) -> Result<Option<CampaignReport>, PortError> {
        let row = self
            .campaigns
            .find_report(
                to_i64(campaign_id.get(), "campaign_id")?,
                to_i32(center_id.get(), "center_id")?,
            )
            .await?;
        row.map(row_to_report).transpose()
    }

    #[instrument(skip(self, report, _metadata), fields(report_id = %report.id))]
    async fn create_report(
        &self,
        report: &CampaignReport,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let row = ReportRow {
            report_id: *report.id.as_uuid(),
            campaign_id: to_i64(report.campaign_id.get(), "campaign_id")?,
            center_id: to_i32(report.center_id.get(), "center_id")?,
            submitted_by: report
                .submitted_by
                .iter()
                .map(|s| to_i64(s.get(), "submitted_by"))
                .collect::<Result<_, _>>()?,
            original_file_name: report.original_file_name.clone(),
            file_ref: report.file_ref.clone(),
            submitted_at: report.submitted_at,
        };
        self.campaigns.insert_report(&row).await?;
        Ok(())
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn transform(message: impl Into<String>) -> PortError {
    PortError::Transformation {
        message: message.into(),
    }
}

fn to_i32(value: u32, field: &str) -> Result<i32, PortError> {
    i32::try_from(value).map_err(|_| {
        transform(format!("{} {} does not fit the column", field, value))
    })
}

fn to_i64(value: u64, field: &str) -> Result<i64, PortError> {
    i64::try_from(value).map_err(|_| {
        transform(format!("{} {} does not fit the column", field, value))
    })
}

fn from_i32(value: i32, field: &str) -> Result<u32, PortError> {
    u32::try_from(value).map_err(|_| transform(format!("stored {} {} is negative", field, value)))
}

fn from_i64(value: i64, field: &str) -> Result<u64, PortError> {
    u64::try_from(value).map_err(|_| transform(format!("stored {} {} is negative", field, value)))
}

fn parse_claim_id(value: &str) -> Result<ClaimIdentity, PortError> {
    value.parse().map_err(|e| transform(format!("stored claim id: {}", e)))
}

fn parse_status(value: &str) -> Result<ClaimStatus, PortError> {
    value.parse().map_err(|e| transform(format!("stored claim status: {}", e)))
}

fn claim_to_rows(claim: &Claim) -> Result<(ClaimRow, Vec<TimelineRow>), PortError> {
    let row = ClaimRow {
        claim_id: claim.id.to_string(),
        center_id: to_i32(claim.center_id().get(), "center_id")?,
        claim_date: claim.claim_date,
        seq: to_i32(claim.id.seq(), "seq")?,
        vin: claim.vin.as_str().to_string(),
        created_by: to_i64(claim.created_by.get(), "created_by")?,
        assigned_technician: claim
            .assigned_technician
            .map(|t| to_i64(t.get(), "assigned_technician"))
            .transpose()?,
        status: claim.status.as_str().to_string(),
        description: claim.description.clone(),
    };
    let timeline = claim
        .timeline
        .iter()
        .zip(1..)
        .map(|(entry, position)| TimelineRow {
            position,
            status: entry.status.as_str().to_string(),
            at: entry.at,
        })
        .collect();
    Ok((row, timeline))
}

fn record_to_claim(record: ClaimRecord) -> Result<Claim, PortError> {
    let row = record.claim;
    let id = ClaimIdentity::new(
        CenterId::new(from_i32(row.center_id, "center_id")?),
        row.claim_date,
        from_i32(row.seq, "seq")?,
    )
    .map_err(|e| transform(e.to_string()))?;

    let timeline = record
        .timeline
        .into_iter()
        .map(|entry| {
            Ok(TimelineEntry {
                status: parse_status(&entry.status)?,
                at: entry.at,
            })
        })
        .collect::<Result<Vec<_>, PortError>>()?;

    let campaign_ids = record
        .campaign_ids
        .into_iter()
        .map(|c| from_i64(c, "campaign_id").map(CampaignId::new))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let claim = Claim {
        id,
        vin: Vin::new(row.vin),
        created_by: StaffId::new(from_i64(row.created_by, "created_by")?),
        assigned_technician: row
            .assigned_technician
            .map(|t| from_i64(t, "assigned_technician").map(StaffId::new))
            .transpose()?,
        status: parse_status(&row.status)?,
        claim_date: row.claim_date,
        description: row.description,
        campaign_ids,
        timeline,
    };

    if !claim.is_timeline_consistent() {
        return Err(transform(format!("claim {} has an inconsistent timeline", claim.id)));
    }
    Ok(claim)
}

fn row_to_part_check(row: PartCheckRow) -> Result<PartCheck, PortError> {
    Ok(PartCheck {
        claim_id: parse_claim_id(&row.claim_id)?,
        part_number: PartNumber::new(row.part_number),
        part_id: PartId::new(from_i64(row.part_id, "part_id")?),
        quantity: from_i32(row.quantity, "quantity")?,
        is_repair: row.is_repair,
        approved: row.approved,
        rejected: row.rejected,
    })
}

fn row_to_catalog_entry(row: CatalogRow) -> Result<PartCatalogEntry, PortError> {
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|e| transform(format!("part {}: {}", row.part_number, e)))?;
    Ok(PartCatalogEntry {
        part_id: PartId::new(from_i64(row.part_id, "part_id")?),
        part_number: PartNumber::new(row.part_number),
        name: row.name,
        unit_price: Money::new(row.unit_price, currency),
        home_warehouse_id: WarehouseId::new(from_i32(row.home_warehouse_id, "home_warehouse_id")?),
    })
}

fn row_to_vehicle(row: VehicleRow) -> Vehicle {
    Vehicle {
        vin: Vin::new(row.vin),
        model: row.model,
        owner_name: row.owner_name,
    }
}

fn row_to_campaign(row: CampaignRow) -> Result<Campaign, PortError> {
    Ok(Campaign {
        id: CampaignId::new(from_i64(row.campaign_id, "campaign_id")?),
        name: row.name,
        models: row.models.into_iter().collect(),
        description: row.description,
        start_date: row.start_date,
        end_date: row.end_date,
    })
}

fn row_to_report(row: ReportRow) -> Result<CampaignReport, PortError> {
    Ok(CampaignReport {
        id: ReportId::from_uuid(row.report_id),
        campaign_id: CampaignId::new(from_i64(row.campaign_id, "campaign_id")?),
        center_id: CenterId::new(from_i32(row.center_id, "center_id")?),
        submitted_by: row
            .submitted_by
            .into_iter()
            .map(|s| from_i64(s, "submitted_by").map(StaffId::new))
            .collect::<Result<_, _>>()?,
        original_file_name: row.original_file_name,
        file_ref: row.file_ref,
        submitted_at: row.submitted_at,
    })
}

fn appointment_status_to_db(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "SCHEDULED",
        AppointmentStatus::Completed => "COMPLETED",
        AppointmentStatus::Cancelled => "CANCELLED",
    }
}

fn appointment_status_from_db(value: &str) -> Result<AppointmentStatus, PortError> {
    match value {
        "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
        "COMPLETED" => Ok(AppointmentStatus::Completed),
        "CANCELLED" => Ok(AppointmentStatus::Cancelled),
        other => Err(transform(format!("unknown appointment status {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain_warranty::NewClaim;

    fn claim() -> Claim {
        let id: ClaimIdentity = "WC-5-2025-10-10-003".parse().unwrap();
        let mut claim = Claim::open(
            id,
            NewClaim {
                vin: Vin::new("RLLVF8AA0SH000001"),
                created_by: StaffId::new(7),
                assigned_technician: Some(StaffId::new(21)),
                description: "Brake noise".to_string(),
            },
            Utc.with_ymd_and_hms(2025, 10, 10, 3, 0, 0).unwrap(),
        );
        claim
            .transition(ClaimStatus::Repair, Utc.with_ymd_and_hms(2025, 10, 10, 4, 0, 0).unwrap())
            .unwrap();
        claim.campaign_ids.insert(CampaignId::new(1));
        claim
    }

    #[test]
    fn test_claim_rows_carry_identity_parts() {
        let (row, timeline) = claim_to_rows(&claim()).unwrap();

        assert_eq!(row.claim_id, "WC-5-2025-10-10-003");
        assert_eq!(row.center_id, 5);
        assert_eq!(row.seq, 3);
        assert_eq!(row.status, "REPAIR");
        assert_eq!(timeline.iter().map(|t| t.position).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_claim_record_conversion() {
        let original = claim();
        let (row, timeline) = claim_to_rows(&original).unwrap();
        let record = ClaimRecord {
            claim: row,
            timeline,
            campaign_ids: vec![1],
        };

        assert_eq!(record_to_claim(record).unwrap(), original);
    }

    #[test]
    fn test_inconsistent_timeline_is_rejected() {
        let (mut row, timeline) = claim_to_rows(&claim()).unwrap();
        row.status = "DONE".to_string();
        let record = ClaimRecord {
            claim: row,
            timeline,
            campaign_ids: vec![],
        };

        let err = record_to_claim(record).unwrap_err();
        assert!(matches!(err, PortError::Transformation { .. }));
    }

    #[test]
    fn test_negative_stored_values_are_rejected() {
        let row = PartCheckRow {
            claim_id: "WC-5-2025-10-10-003".to_string(),
            part_number: "A".to_string(),
            part_id: 1,
            quantity: -1,
            is_repair: true,
            approved: false,
            rejected: false,
        };
        assert!(row_to_part_check(row).is_err());
    }

    #[test]
    fn test_appointment_status_mapping() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(
                appointment_status_from_db(appointment_status_to_db(status)).unwrap(),
                status
            );
        }
        assert!(appointment_status_from_db("LOST").is_err());
    }
}
