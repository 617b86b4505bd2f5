//! Warranty Domain Ports
//!
//! The workflow reaches every collaborator (claims storage, part checks, the
//! parts catalog, warehouse stock, vehicles, campaigns, appointments, and
//! campaign reports) through the traits in this module. Two adapters ship:
//!
//! - **PostgreSQL**: `infra_db::adapters::PostgresWarrantyAdapter`
//! - **In-memory**: [`mock::InMemoryWarrantyStore`], for tests and local runs
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_warranty::ports::WarrantyPorts;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresWarrantyAdapter::new(pool));
//! let ports = WarrantyPorts::from_adapter(adapter);
//! let workflow = WarrantyWorkflow::new(ports, clock, config);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{
    CampaignId, CenterId, DomainPort, HealthCheckable, OperationMetadata, PartNumber,
    PortError, Vin, WarehouseId,
};

use crate::appointment::Appointment;
use crate::campaign::Campaign;
use crate::claim::{Claim, ClaimComment, ClaimQuery, ClaimStatus, TimelineEntry};
use crate::identity::ClaimIdentity;
use crate::inventory::{PartCatalogEntry, StockDelta};
use crate::part_check::{PartCheck, PartCheckUpdate};
use crate::report::CampaignReport;
use crate::vehicle::Vehicle;

/// Claim storage
#[async_trait]
pub trait ClaimPort: DomainPort {
    /// Stores a new claim; an existing id is a `PortError::Conflict`
    async fn create_claim(
        &self,
        claim: &Claim,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn get_claim(&self, id: ClaimIdentity) -> Result<Claim, PortError>;

    async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError>;

    /// Allocates the next sequence for a (center, day)
    ///
    /// Implementations must hand out distinct values under concurrency. The
    /// first allocation of a day starts after any claims already stored with
    /// that prefix.
    async fn next_claim_sequence(
        &self,
        center_id: CenterId,
        date: NaiveDate,
    ) -> Result<u32, PortError>;

    /// Appends `entry` if the claim is still in `expected`; otherwise `PortError::Conflict`
    async fn transition_claim(
        &self,
        id: ClaimIdentity,
        expected: ClaimStatus,
        entry: TimelineEntry,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;

    async fn add_campaign(
        &self,
        id: ClaimIdentity,
        campaign_id: CampaignId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn post_comment(
        &self,
        comment: &ClaimComment,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn list_comments(&self, id: ClaimIdentity) -> Result<Vec<ClaimComment>, PortError>;
}

/// Technician part checks
#[async_trait]
pub trait PartCheckPort: DomainPort {
    /// Stores checks; a duplicate (claim, part number) is a `PortError::Conflict`
    async fn record_part_checks(
        &self,
        checks: &[PartCheck],
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn search_by_claim(&self, claim_id: ClaimIdentity) -> Result<Vec<PartCheck>, PortError>;

    async fn update_part_check(
        &self,
        claim_id: ClaimIdentity,
        part_number: &PartNumber,
        update: &PartCheckUpdate,
        metadata: Option<OperationMetadata>,
    ) -> Result<PartCheck, PortError>;
}

/// Parts catalog
#[async_trait]
pub trait CatalogPort: DomainPort {
    async fn list_parts(&self) -> Result<Vec<PartCatalogEntry>, PortError>;
}

/// Warehouse stock
#[async_trait]
pub trait InventoryPort: DomainPort {
    /// Applies a signed delta and returns the new level
    ///
    /// A delta that would take stock below zero is a `PortError::Conflict`.
    /// A delta whose reference was already recorded is not applied again;
    /// the current level is returned.
    async fn adjust_stock(
        &self,
        delta: &StockDelta,
        metadata: Option<OperationMetadata>,
    ) -> Result<i64, PortError>;

    /// Whether a movement with this reference has been applied
    async fn movement_recorded(&self, reference: &str) -> Result<bool, PortError>;

    async fn stock_level(
        &self,
        warehouse_id: WarehouseId,
        part_number: &PartNumber,
    ) -> Result<i64, PortError>;
}

/// Vehicle registry (read-only)
#[async_trait]
pub trait VehiclePort: DomainPort {
    async fn get_vehicle(&self, vin: &Vin) -> Result<Vehicle, PortError>;

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, PortError>;
}

#[async_trait]
pub trait CampaignPort: DomainPort {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, PortError>;

    async fn get_campaign(&self, id: CampaignId) -> Result<Campaign, PortError>;

    /// Allocates a fresh campaign id; never repeats
    async fn next_campaign_id(&self) -> Result<CampaignId, PortError>;

    /// Inserts or replaces a campaign
    async fn save_campaign(
        &self,
        campaign: &Campaign,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

#[async_trait]
pub trait AppointmentPort: DomainPort {
    async fn create_appointment(
        &self,
        appointment: &Appointment,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn list_appointments(&self) -> Result<Vec<Appointment>, PortError>;
}

#[async_trait]
pub trait ReportPort: DomainPort {
    async fn find_report(
        &self,
        campaign_id: CampaignId,
        center_id: CenterId,
    ) -> Result<Option<CampaignReport>, PortError>;

    /// Stores a report; a second report for the same (campaign, center) is a `PortError::Conflict`
    async fn create_report(
        &self,
        report: &CampaignReport,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Every port an adapter must provide to back the whole workflow
pub trait WarrantyStore:
    ClaimPort
    + PartCheckPort
    + CatalogPort
    + InventoryPort
    + VehiclePort
    + CampaignPort
    + AppointmentPort
    + ReportPort
    + HealthCheckable
{
}

impl<T> WarrantyStore for T where
    T: ClaimPort
        + PartCheckPort
        + CatalogPort
        + InventoryPort
        + VehiclePort
        + CampaignPort
        + AppointmentPort
        + ReportPort
        + HealthCheckable
{
}

/// The set of ports the workflow runs against
///
/// Ports may come from different adapters; [`WarrantyPorts::from_adapter`]
/// wires a single adapter into every slot.
#[derive(Clone)]
pub struct WarrantyPorts {
    pub claims: Arc<dyn ClaimPort>,
    pub part_checks: Arc<dyn PartCheckPort>,
    pub catalog: Arc<dyn CatalogPort>,
    pub inventory: Arc<dyn InventoryPort>,
    pub vehicles: Arc<dyn VehiclePort>,
    pub campaigns: Arc<dyn CampaignPort>,
    pub appointments: Arc<dyn AppointmentPort>,
    pub reports: Arc<dyn ReportPort>,
    pub health: Arc<dyn HealthCheckable>,
}

impl WarrantyPorts {
    pub fn from_adapter<A: WarrantyStore>(adapter: Arc<A>) -> Self {
        Self {
            claims: adapter.clone(),
            part_checks: adapter.clone(),
            catalog: adapter.clone(),
            inventory: adapter.clone(),
            vehicles: adapter.clone(),
            campaigns: adapter.clone(),
            appointments: adapter.clone(),
            reports: adapter.clone(),
            health: adapter,
        }
    }
}

/// In-memory implementation of every warranty port
///
/// Holds all state behind async locks and supports scripted failures and
/// delays per operation, so workflow tests can break any collaborator call.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
    use std::time::Duration;

    use chrono::Utc;
    use tokio::sync::{Mutex, RwLock};

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::inventory::Warehouse;

    /// Operations that can be scripted to fail or stall
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum MockOperation {
        CreateClaim,
        NextSequence,
        Transition,
        AddCampaign,
        PostComment,
        RecordPartChecks,
        UpdatePartCheck,
        ListParts,
        AdjustStock,
        CreateAppointment,
        SaveCampaign,
        CreateReport,
    }

    #[derive(Debug, Clone, Copy)]
    pub enum Fault {
        /// Fail with a connection error (transient)
        Unavailable,
        /// Fail with an internal error (not transient)
        Broken,
        /// Sleep before running the operation normally
        Delay(Duration),
        /// Run the operation, then fail with a connection error as if the
        /// reply was lost. Honored by claim transitions, part check updates,
        /// and stock adjustments; other operations just succeed.
        Lost,
    }

    /// Whether a tripped operation reports its result
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Reply {
        Deliver,
        Lose,
    }

    impl Reply {
        fn deliver<T>(self, operation: MockOperation, value: T) -> Result<T, PortError> {
            match self {
                Reply::Deliver => Ok(value),
                Reply::Lose => Err(PortError::connection(format!(
                    "reply lost after {:?}",
                    operation
                ))),
            }
        }
    }

    #[derive(Debug)]
    struct ScriptedFault {
        skip: usize,
        fault: Fault,
    }

    #[derive(Debug, Default)]
    struct State {
        claims: BTreeMap<ClaimIdentity, Claim>,
        sequences: HashMap<(CenterId, NaiveDate), u32>,
        comments: Vec<ClaimComment>,
        part_checks: Vec<PartCheck>,
        catalog: Vec<PartCatalogEntry>,
        warehouses: BTreeMap<WarehouseId, Warehouse>,
        stock_log: Vec<StockDelta>,
        movements: HashSet<String>,
        vehicles: BTreeMap<Vin, Vehicle>,
        campaigns: BTreeMap<CampaignId, Campaign>,
        last_campaign_id: u64,
        appointments: Vec<Appointment>,
        reports: Vec<CampaignReport>,
    }

    #[derive(Debug, Default)]
    pub struct InMemoryWarrantyStore {
        state: RwLock<State>,
        faults: Mutex<HashMap<MockOperation, VecDeque<ScriptedFault>>>,
    }

    impl InMemoryWarrantyStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes the next call to `operation` fail or stall
        pub async fn inject(&self, operation: MockOperation, fault: Fault) {
            self.inject_after(operation, 0, fault).await;
        }

        /// Lets `skip` calls to `operation` through, then applies `fault` once
        pub async fn inject_after(&self, operation: MockOperation, skip: usize, fault: Fault) {
            self.faults
                .lock()
                .await
                .entry(operation)
                .or_default()
                .push_back(ScriptedFault { skip, fault });
        }

        async fn trip(&self, operation: MockOperation) -> Result<Reply, PortError> {
            let fault = {
                let mut faults = self.faults.lock().await;
                let Some(queue) = faults.get_mut(&operation) else {
                    return Ok(Reply::Deliver);
                };
                match queue.front_mut() {
                    Some(next) if next.skip > 0 => {
                        next.skip -= 1;
                        None
                    }
                    Some(_) => queue.pop_front().map(|scripted| scripted.fault),
                    None => None,
                }
            };

            match fault {
                None => Ok(Reply::Deliver),
                Some(Fault::Lost) => Ok(Reply::Lose),
                Some(Fault::Delay(duration)) => {
                    tokio::time::sleep(duration).await;
                    Ok(Reply::Deliver)
                }
                Some(Fault::Unavailable) => Err(PortError::connection(format!(
                    "injected outage in {:?}",
                    operation
                ))),
                Some(Fault::Broken) => Err(PortError::internal(format!(
                    "injected failure in {:?}",
                    operation
                ))),
            }
        }

        pub async fn seed_vehicle(&self, vehicle: Vehicle) {
            self.state.write().await.vehicles.insert(vehicle.vin.clone(), vehicle);
        }

        pub async fn seed_campaign(&self, campaign: Campaign) {
            let mut state = self.state.write().await;
            state.last_campaign_id = state.last_campaign_id.max(campaign.id.get());
            state.campaigns.insert(campaign.id, campaign);
        }

        pub async fn seed_catalog(&self, entries: Vec<PartCatalogEntry>) {
            self.state.write().await.catalog.extend(entries);
        }

        pub async fn seed_stock(
            &self,
            warehouse_id: WarehouseId,
            part_number: PartNumber,
            quantity: i64,
        ) {
            let mut state = self.state.write().await;
            state
                .warehouses
                .entry(warehouse_id)
                .or_insert_with(|| Warehouse::new(warehouse_id))
                .stock
                .insert(part_number, quantity);
        }

        pub async fn seed_claim(&self, claim: Claim) {
            self.state.write().await.claims.insert(claim.id, claim);
        }

        pub async fn seed_part_checks(&self, checks: Vec<PartCheck>) {
            self.state.write().await.part_checks.extend(checks);
        }

        /// Every stock delta applied so far, in order
        pub async fn stock_log(&self) -> Vec<StockDelta> {
            self.state.read().await.stock_log.clone()
        }

        pub async fn part_checks(&self) -> Vec<PartCheck> {
            self.state.read().await.part_checks.clone()
        }
    }

    impl DomainPort for InMemoryWarrantyStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryWarrantyStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-warranty-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("In-memory store always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClaimPort for InMemoryWarrantyStore {
        async fn create_claim(
            &self,
            claim: &Claim,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::CreateClaim).await?;
            let mut state = self.state.write().await;
            if state.claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!("claim {} already exists", claim.id)));
            }
            state.claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn get_claim(&self, id: ClaimIdentity) -> Result<Claim, PortError> {
            self.state
                .read()
                .await
                .claims
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .claims
                .values()
                .filter(|claim| query.matches(claim))
                .cloned()
                .collect())
        }

        async fn next_claim_sequence(
            &self,
            center_id: CenterId,
            date: NaiveDate,
        ) -> Result<u32, PortError> {
            self.trip(MockOperation::NextSequence).await?;
            let mut state = self.state.write().await;
            let existing = state
                .claims
                .keys()
                .filter(|id| id.has_prefix(center_id, date))
                .count() as u32;
            let counter = state.sequences.entry((center_id, date)).or_insert(existing);
            *counter += 1;
            Ok(*counter)
        }

        async fn transition_claim(
            &self,
            id: ClaimIdentity,
            expected: ClaimStatus,
            entry: TimelineEntry,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            let reply = self.trip(MockOperation::Transition).await?;
            let mut state = self.state.write().await;
            let claim = state
                .claims
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Claim", id))?;
            if claim.status != expected {
                return Err(PortError::conflict(format!(
                    "claim {} is {}, expected {}",
                    id, claim.status, expected
                )));
            }
            claim
                .apply_entry(entry)
                .map_err(|e| PortError::conflict(e.to_string()))?;
            reply.deliver(MockOperation::Transition, claim.clone())
        }

        async fn add_campaign(
            &self,
            id: ClaimIdentity,
            campaign_id: CampaignId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::AddCampaign).await?;
            let mut state = self.state.write().await;
            let claim = state
                .claims
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Claim", id))?;
            claim.campaign_ids.insert(campaign_id);
            Ok(())
        }

        async fn post_comment(
            &self,
            comment: &ClaimComment,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::PostComment).await?;
            self.state.write().await.comments.push(comment.clone());
            Ok(())
        }

        async fn list_comments(&self, id: ClaimIdentity) -> Result<Vec<ClaimComment>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .comments
                .iter()
                .filter(|c| c.claim_id == id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl PartCheckPort for InMemoryWarrantyStore {
        async fn record_part_checks(
            &self,
            checks: &[PartCheck],
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::RecordPartChecks).await?;
            let mut state = self.state.write().await;
            for check in checks {
                let duplicate = state
                    .part_checks
                    .iter()
                    .any(|c| c.claim_id == check.claim_id && c.part_number == check.part_number);
                if duplicate {
                    return Err(PortError::conflict(format!(
                        "part {} already checked on claim {}",
                        check.part_number, check.claim_id
                    )));
                }
            }
            state.part_checks.extend(checks.iter().cloned());
            Ok(())
        }

        async fn search_by_claim(
            &self,
            claim_id: ClaimIdentity,
        ) -> Result<Vec<PartCheck>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .part_checks
                .iter()
                .filter(|c| c.claim_id == claim_id)
                .cloned()
                .collect())
        }

        async fn update_part_check(
            &self,
            claim_id: ClaimIdentity,
            part_number: &PartNumber,
            update: &PartCheckUpdate,
            _metadata: Option<OperationMetadata>,
        ) -> Result<PartCheck, PortError> {
            let reply = self.trip(MockOperation::UpdatePartCheck).await?;
            let mut state = self.state.write().await;
            let check = state
                .part_checks
                .iter_mut()
                .find(|c| c.claim_id == claim_id && &c.part_number == part_number)
                .ok_or_else(|| {
                    PortError::not_found("PartCheck", format!("{}/{}", claim_id, part_number))
                })?;
            check.apply_update(update);
            reply.deliver(MockOperation::UpdatePartCheck, check.clone())
        }
    }

    #[async_trait]
    impl CatalogPort for InMemoryWarrantyStore {
        async fn list_parts(&self) -> Result<Vec<PartCatalogEntry>, PortError> {
            self.trip(MockOperation::ListParts).await?;
            Ok(self.state.read().await.catalog.clone())
        }
    }

    #[async_trait]
    impl InventoryPort for InMemoryWarrantyStore {
        async fn adjust_stock(
            &self,
            delta: &StockDelta,
            _metadata: Option<OperationMetadata>,
        ) -> Result<i64, PortError> {
            let reply = self.trip(MockOperation::AdjustStock).await?;
            let mut state = self.state.write().await;
            if let Some(reference) = &delta.reference {
                if state.movements.contains(reference) {
                    let level = state
                        .warehouses
                        .get(&delta.warehouse_id)
                        .map_or(0, |w| w.quantity(&delta.part_number));
                    return reply.deliver(MockOperation::AdjustStock, level);
                }
            }
            let level = state
                .warehouses
                .entry(delta.warehouse_id)
                .or_insert_with(|| Warehouse::new(delta.warehouse_id))
                .try_apply(&delta.part_number, delta.delta)
                .ok_or_else(|| {
                    PortError::conflict(format!(
                        "stock of {} in warehouse {} cannot go below zero",
                        delta.part_number, delta.warehouse_id
                    ))
                })?;
            if let Some(reference) = &delta.reference {
                state.movements.insert(reference.clone());
            }
            state.stock_log.push(delta.clone());
            reply.deliver(MockOperation::AdjustStock, level)
        }

        async fn movement_recorded(&self, reference: &str) -> Result<bool, PortError> {
            Ok(self.state.read().await.movements.contains(reference))
        }

        async fn stock_level(
            &self,
            warehouse_id: WarehouseId,
            part_number: &PartNumber,
        ) -> Result<i64, PortError> {
            Ok(self
                .state
                .read()
                .await
                .warehouses
                .get(&warehouse_id)
                .map_or(0, |w| w.quantity(part_number)))
        }
    }

    #[async_trait]
    impl VehiclePort for InMemoryWarrantyStore {
        async fn get_vehicle(&self, vin: &Vin) -> Result<Vehicle, PortError> {
            self.state
                .read()
                .await
                .vehicles
                .get(vin)
                .cloned()
                .ok_or_else(|| PortError::not_found("Vehicle", vin))
        }

        async fn list_vehicles(&self) -> Result<Vec<Vehicle>, PortError> {
            Ok(self.state.read().await.vehicles.values().cloned().collect())
        }
    }

    #[async_trait]
    impl CampaignPort for InMemoryWarrantyStore {
        async fn list_campaigns(&self) -> Result<Vec<Campaign>, PortError> {
            Ok(self.state.read().await.campaigns.values().cloned().collect())
        }

        async fn get_campaign(&self, id: CampaignId) -> Result<Campaign, PortError> {
            self.state
                .read()
                .await
                .campaigns
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Campaign", id))
        }

        async fn next_campaign_id(&self) -> Result<CampaignId, PortError> {
            let mut state = self.state.write().await;
            state.last_campaign_id += 1;
            Ok(CampaignId::new(state.last_campaign_id))
        }

        async fn save_campaign(
            &self,
            campaign: &Campaign,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::SaveCampaign).await?;
            self.state.write().await.campaigns.insert(campaign.id, campaign.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl AppointmentPort for InMemoryWarrantyStore {
        async fn create_appointment(
            &self,
            appointment: &Appointment,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::CreateAppointment).await?;
            self.state.write().await.appointments.push(appointment.clone());
            Ok(())
        }

        async fn list_appointments(&self) -> Result<Vec<Appointment>, PortError> {
            Ok(self.state.read().await.appointments.clone())
        }
    }

    #[async_trait]
    impl ReportPort for InMemoryWarrantyStore {
        async fn find_report(
            &self,
            campaign_id: CampaignId,
            center_id: CenterId,
        ) -> Result<Option<CampaignReport>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .reports
                .iter()
                .find(|r| r.campaign_id == campaign_id && r.center_id == center_id)
                .cloned())
        }

        async fn create_report(
            &self,
            report: &CampaignReport,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.trip(MockOperation::CreateReport).await?;
            let mut state = self.state.write().await;
            if state
                .reports
                .iter()
                .any(|r| r.campaign_id == report.campaign_id && r.center_id == report.center_id)
            {
                return Err(PortError::conflict(format!(
                    "report for campaign {} and center {} already exists",
                    report.campaign_id, report.center_id
                )));
            }
            state.reports.push(report.clone());
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::claim::NewClaim;
        use core_kernel::StaffId;

        fn day() -> NaiveDate {
            NaiveDate::from_ymd_opt(2025, 10, 10).unwrap()
        }

        #[tokio::test]
        async fn test_sequence_counts_existing_claims() {
            let store = InMemoryWarrantyStore::new();
            let center = CenterId::new(12);
            assert_eq!(store.next_claim_sequence(center, day()).await.unwrap(), 1);
            assert_eq!(store.next_claim_sequence(center, day()).await.unwrap(), 2);
            assert_eq!(store.next_claim_sequence(CenterId::new(13), day()).await.unwrap(), 1);

            let seeded = InMemoryWarrantyStore::new();
            let id = ClaimIdentity::new(center, day(), 1).unwrap();
            seeded
                .seed_claim(Claim::open(
                    id,
                    NewClaim {
                        vin: Vin::new("v"),
                        created_by: StaffId::new(1),
                        assigned_technician: None,
                        description: String::new(),
                    },
                    Utc::now(),
                ))
                .await;
            assert_eq!(seeded.next_claim_sequence(center, day()).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_stock_cannot_go_negative() {
            let store = InMemoryWarrantyStore::new();
            let part = PartNumber::new("A");
            store.seed_stock(WarehouseId::new(1), part.clone(), 1).await;

            let debit = StockDelta::debit(WarehouseId::new(1), part.clone(), 2);
            let err = store.adjust_stock(&debit, None).await.unwrap_err();
            assert!(err.is_conflict());
            assert_eq!(store.stock_level(WarehouseId::new(1), &part).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_referenced_movement_applies_once() {
            let store = InMemoryWarrantyStore::new();
            let part = PartNumber::new("A");
            store.seed_stock(WarehouseId::new(1), part.clone(), 5).await;
            let debit =
                StockDelta::debit(WarehouseId::new(1), part.clone(), 2).with_reference("m-1");

            assert!(!store.movement_recorded("m-1").await.unwrap());
            assert_eq!(store.adjust_stock(&debit, None).await.unwrap(), 3);
            assert_eq!(store.adjust_stock(&debit, None).await.unwrap(), 3);
            assert!(store.movement_recorded("m-1").await.unwrap());
            assert_eq!(store.stock_log().await.len(), 1);
        }

        #[tokio::test]
        async fn test_lost_reply_still_applies() {
            let store = InMemoryWarrantyStore::new();
            let part = PartNumber::new("A");
            store.seed_stock(WarehouseId::new(1), part.clone(), 5).await;
            store.inject(MockOperation::AdjustStock, Fault::Lost).await;

            let debit = StockDelta::debit(WarehouseId::new(1), part.clone(), 2);
            let err = store.adjust_stock(&debit, None).await.unwrap_err();

            assert!(err.is_transient());
            assert_eq!(store.stock_level(WarehouseId::new(1), &part).await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_injected_fault_fires_once_after_skip() {
            let store = InMemoryWarrantyStore::new();
            store.inject_after(MockOperation::NextSequence, 1, Fault::Unavailable).await;

            let center = CenterId::new(1);
            assert!(store.next_claim_sequence(center, day()).await.is_ok());
            let err = store.next_claim_sequence(center, day()).await.unwrap_err();
            assert!(err.is_transient());
            assert!(store.next_claim_sequence(center, day()).await.is_ok());
        }
    }
}
