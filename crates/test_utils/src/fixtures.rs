//! Pre-built Test Fixtures
//!
//! One service center (5) with its warehouse, a second warehouse (7), three
//! vehicles, four campaigns around a fixed "today" of 2025-10-10, and a
//! four-part catalog. Every suite that seeds these sees the same world.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    CampaignId, CenterId, Currency, FixedClock, Money, PartId, PartNumber, StaffId, Vin,
    WarehouseId,
};
use domain_warranty::{
    Campaign, Claim, InMemoryWarrantyStore, NewPartCheck, PartCatalogEntry, PartCheck, Vehicle,
    WarrantyPorts, WarrantyWorkflow, WorkflowConfig,
};

/// Service center the fixtures file claims under
pub const CENTER: CenterId = CenterId::new(5);
/// Warehouse that does not belong to [`CENTER`]
pub const OTHER_WAREHOUSE: WarehouseId = WarehouseId::new(7);
pub const CREATOR: StaffId = StaffId::new(7);
pub const TECHNICIAN: StaffId = StaffId::new(21);
pub const EVM: StaffId = StaffId::new(900);

/// Units of each catalog part on hand before a test runs
pub const INITIAL_STOCK: i64 = 10;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Friday 2025-10-10, 03:00 UTC
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 10, 3, 0, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        Self::date(2025, 10, 10)
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(Self::now()))
    }
}

/// Fixture for vehicles
pub struct VehicleFixtures;

impl VehicleFixtures {
    /// Affected by exactly one campaign
    pub fn vf8() -> Vin {
        Vin::new("RLLVF8AA0SH000001")
    }

    /// Affected by two overlapping campaigns
    pub fn vf9() -> Vin {
        Vin::new("RLLVF9AA0SH000002")
    }

    /// Its only campaign has completed
    pub fn vf5() -> Vin {
        Vin::new("RLLVF5AA0SH000003")
    }

    pub fn all() -> Vec<Vehicle> {
        vec![
            Vehicle::new(Self::vf8(), "VF8").with_owner("Nguyen Van A"),
            Vehicle::new(Self::vf9(), "VF9"),
            Vehicle::new(Self::vf5(), "VF5"),
        ]
    }
}

/// Fixture for campaigns
pub struct CampaignFixtures;

impl CampaignFixtures {
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

    /// Running on 2025-10-10, VF8 only
    pub fn vf8_brake_recall() -> Campaign {
        let d = TemporalFixtures::date;
        Self::campaign(1, "VF8 brake recall", &["VF8"], d(2025, 10, 1), d(2025, 10, 31))
    }

    /// Completed before 2025-10-10
    pub fn vf5_airbag_recall() -> Campaign {
        let d = TemporalFixtures::date;
        Self::campaign(9, "VF5 airbag recall", &["VF5"], d(2025, 8, 1), d(2025, 9, 30))
    }

    pub fn all() -> Vec<Campaign> {
        let d = TemporalFixtures::date;
        vec![
            Self::vf8_brake_recall(),
            Self::campaign(2, "VF9 software update", &["VF9"], d(2025, 9, 20), d(2025, 11, 30)),
            Self::campaign(3, "VF9 seat inspection", &["VF9"], d(2025, 10, 5), d(2025, 10, 20)),
            Self::vf5_airbag_recall(),
        ]
    }
}

/// Fixture for the parts catalog
pub struct CatalogFixtures;

impl CatalogFixtures {
    pub fn part(number: &str, id: u64, price: Decimal, home: u32) -> PartCatalogEntry {
        PartCatalogEntry {
            part_id: PartId::new(id),
            part_number: PartNumber::new(number),
            name: format!("Part {}", number),
            unit_price: Money::new(price, Currency::VND),
            home_warehouse_id: WarehouseId::new(home),
        }
    }

    /// A, B, and D live at center 5; C lives at warehouse 7
    pub fn all() -> Vec<PartCatalogEntry> {
        vec![
            Self::part("A", 1, dec!(500000), 5),
            Self::part("B", 2, dec!(300000), 5),
            Self::part("C", 3, dec!(200000), 7),
            Self::part("D", 4, dec!(150000), 5),
        ]
    }

    /// Technician input for a catalog part
    pub fn check(number: &str, quantity: u32, is_repair: bool) -> NewPartCheck {
        let part_id = Self::all()
            .into_iter()
            .find(|p| p.part_number.as_str() == number)
            .map(|p| p.part_id)
            .unwrap_or(PartId::new(99));
        NewPartCheck {
            part_number: PartNumber::new(number),
            part_id,
            quantity,
            is_repair,
        }
    }
}

/// Fixture for money values
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn vnd(amount: Decimal) -> Money {
        Money::new(amount, Currency::VND)
    }

    pub fn vnd_zero() -> Money {
        Money::zero(Currency::VND)
    }
}

/// Seeds the standard world into an in-memory store
pub async fn seed_store(store: &InMemoryWarrantyStore) {
    for vehicle in VehicleFixtures::all() {
        store.seed_vehicle(vehicle).await;
    }
    for campaign in CampaignFixtures::all() {
        store.seed_campaign(campaign).await;
    }
    let catalog = CatalogFixtures::all();
    for entry in &catalog {
        store
            .seed_stock(entry.home_warehouse_id, entry.part_number.clone(), INITIAL_STOCK)
            .await;
    }
    store.seed_catalog(catalog).await;
}

/// A seeded in-memory store and a workflow over it at [`TemporalFixtures::now`]
pub struct MockWorld {
    pub store: Arc<InMemoryWarrantyStore>,
    pub clock: Arc<FixedClock>,
    pub workflow: Arc<WarrantyWorkflow>,
}

impl MockWorld {
    pub async fn new() -> Self {
        Self::with_config(WorkflowConfig::default()).await
    }

    pub async fn with_config(config: WorkflowConfig) -> Self {
        let store = Arc::new(InMemoryWarrantyStore::new());
        seed_store(&store).await;

        let clock = TemporalFixtures::clock();
        let workflow = Arc::new(WarrantyWorkflow::new(
            WarrantyPorts::from_adapter(store.clone()),
            clock.clone(),
            config,
        ));

        Self { store, clock, workflow }
    }

    /// Stores a prebuilt claim and its part checks, bypassing the workflow
    pub async fn seed_claim(&self, claim: Claim, checks: Vec<PartCheck>) {
        self.store.seed_claim(claim).await;
        self.store.seed_part_checks(checks).await;
    }
}
