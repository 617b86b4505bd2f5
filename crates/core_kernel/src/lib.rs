//! Core Kernel - Foundational types shared by the warranty workspace
//!
//! This crate provides the building blocks used by every other crate:
//! - Money types with precise decimal arithmetic
//! - Calendar windows, timezones, and an injectable clock
//! - Strongly-typed identifiers
//! - Port infrastructure for collaborator boundaries

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Clock, DateWindow, FixedClock, SystemClock, TemporalError, Timezone};
pub use identifiers::{
    AppointmentId, CampaignId, CenterId, CommentId, FinalizeAttemptId, PartId, PartNumber,
    ReportId, StaffId, Vin, WarehouseId,
};
pub use ports::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
