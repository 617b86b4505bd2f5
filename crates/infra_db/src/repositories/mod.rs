//! Repository implementations for warranty records
//!
//! Each repository owns the SQL for one group of tables and speaks in plain
//! row types. Mapping rows to domain values happens in the adapter layer.
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` rows), so
//! the crate builds without a live database.

pub mod campaigns;
pub mod claims;
pub mod inventory;
pub mod part_checks;
pub mod vehicles;

pub use campaigns::CampaignRepository;
pub use claims::ClaimsRepository;
pub use inventory::InventoryRepository;
pub use part_checks::PartCheckRepository;
pub use vehicles::VehicleRepository;
