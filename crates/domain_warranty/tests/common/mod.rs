//! Shared fixtures for workflow tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{
    CampaignId, CenterId, Currency, FixedClock, Money, PartId, PartNumber, StaffId, Vin,
    WarehouseId,
};
use domain_warranty::{
    Campaign, ClaimIdentity, CreateClaimRequest, InMemoryWarrantyStore, NewPartCheck,
    PartCatalogEntry, Vehicle, WarrantyPorts, WarrantyWorkflow, WorkflowConfig,
};

pub const CENTER: CenterId = CenterId::new(5);
pub const TECHNICIAN: StaffId = StaffId::new(21);
pub const EVM: StaffId = StaffId::new(900);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Friday 2025-10-10, 03:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 10, 3, 0, 0).unwrap()
}

pub fn vf8() -> Vin {
    Vin::new("RLLVF8AA0SH000001")
}

pub fn vf9() -> Vin {
    Vin::new("RLLVF9AA0SH000002")
}

pub fn vf5() -> Vin {
    Vin::new("RLLVF5AA0SH000003")
}

pub fn campaign(
    id: u64,
    name: &str,
    models: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> Campaign {
    Campaign {
        id: CampaignId::new(id),
        name: name.to_string(),
        models: models.iter().map(|m| m.to_string()).collect(),
        description: None,
        start_date: start,
        end_date: end,
    }
}

pub fn part(number: &str, id: u64, price: rust_decimal::Decimal, home: u32) -> PartCatalogEntry {
    PartCatalogEntry {
        part_id: PartId::new(id),
        part_number: PartNumber::new(number),
        name: format!("Part {}", number),
        unit_price: Money::new(price, Currency::VND),
        home_warehouse_id: WarehouseId::new(home),
    }
}

pub fn check(number: &str, id: u64, quantity: u32, is_repair: bool) -> NewPartCheck {
    NewPartCheck {
        part_number: PartNumber::new(number),
        part_id: PartId::new(id),
        quantity,
        is_repair,
    }
}

pub struct Harness {
    pub store: Arc<InMemoryWarrantyStore>,
    pub clock: Arc<FixedClock>,
    pub workflow: Arc<WarrantyWorkflow>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(WorkflowConfig::default()).await
    }

    pub async fn with_step_timeout(step_timeout: Duration) -> Self {
        Self::with_config(WorkflowConfig {
            step_timeout,
            ..WorkflowConfig::default()
        })
        .await
    }

    pub async fn with_config(config: WorkflowConfig) -> Self {
        let store = Arc::new(InMemoryWarrantyStore::new());

        store.seed_vehicle(Vehicle::new(vf8(), "VF8").with_owner("Nguyen Van A")).await;
        store.seed_vehicle(Vehicle::new(vf9(), "VF9")).await;
        store.seed_vehicle(Vehicle::new(vf5(), "VF5")).await;

        store
            .seed_campaign(campaign(
                1, "VF8 brake recall", &["VF8"],
                date(2025, 10, 1), date(2025, 10, 31),
            ))
            .await;
        store
            .seed_campaign(campaign(
                2, "VF9 software update", &["VF9"],
                date(2025, 9, 20), date(2025, 11, 30),
            ))
            .await;
        store
            .seed_campaign(campaign(
                3, "VF9 seat inspection", &["VF9"],
                date(2025, 10, 5), date(2025, 10, 20),
            ))
            .await;
        store
            .seed_campaign(campaign(
                9, "VF5 airbag recall", &["VF5"],
                date(2025, 8, 1), date(2025, 9, 30),
            ))
            .await;

        store
            .seed_catalog(vec![
                part("A", 1, dec!(500000), 5),
                part("B", 2, dec!(300000), 5),
                part("C", 3, dec!(200000), 7),
                part("D", 4, dec!(150000), 5),
            ])
            .await;
        for number in ["A", "B", "D"] {
            store.seed_stock(WarehouseId::new(5), PartNumber::new(number), 10).await;
        }
        store.seed_stock(WarehouseId::new(7), PartNumber::new("C"), 10).await;

        let clock = Arc::new(FixedClock::at(now()));
        let workflow = Arc::new(WarrantyWorkflow::new(
            WarrantyPorts::from_adapter(store.clone()),
            clock.clone(),
            config,
        ));

        Self { store, clock, workflow }
    }

    pub fn request(&self, vin: Vin) -> CreateClaimRequest {
        CreateClaimRequest {
            center_id: CENTER,
            vin,
            created_by: StaffId::new(7),
            assigned_technician: Some(TECHNICIAN),
            description: "Brake noise at low speed".to_string(),
            confirm_campaign: false,
            campaign_id: None,
        }
    }

    /// Opens a claim at center 5 and walks it to DECIDE with the given checks
    pub async fn claim_in_decide(&self, checks: Vec<NewPartCheck>) -> ClaimIdentity {
        let created = self.workflow.create_claim(self.request(vf5()), None).await.unwrap();
        let id = created.claim.id;
        self.workflow.record_technician_check(id, checks, None).await.unwrap();
        self.workflow.request_decision(id, None).await.unwrap();
        id
    }

    pub async fn stock(&self, warehouse: u32, number: &str) -> i64 {
        use domain_warranty::InventoryPort;
        self.store
            .stock_level(WarehouseId::new(warehouse), &PartNumber::new(number))
            .await
            .unwrap()
    }

    pub async fn is_repair(&self, id: ClaimIdentity, number: &str) -> bool {
        self.store
            .part_checks()
            .await
            .into_iter()
            .find(|c| c.claim_id == id && c.part_number == PartNumber::new(number))
            .map(|c| c.is_repair)
            .unwrap()
    }
}
