//! Warranty Claim Domain
//!
//! This crate carries a warranty claim from technician inspection to
//! closeout, coordinating per-part approval, warehouse stock debits, and
//! campaign-linked appointments.
//!
//! # Claim Lifecycle
//!
//! ```text
//! CHECK -> REPAIR -> DECIDE -> DONE      (some parts approved, stock debited)
//!                          \-> HANDOVER  (nothing approved, no stock touched)
//! ```
//!
//! - **CHECK**: the technician records part checks
//! - **REPAIR**: at least one part is flagged for repair
//! - **DECIDE**: each repair part must be approved or rejected
//! - **DONE / HANDOVER**: the decision pass has run
//!
//! The decision pass runs as a saga (see [`saga`]): rejected parts are
//! released from the repair path, approved parts are debited from the
//! center's own warehouse, a closing comment is posted, and the claim
//! transitions. A failure at any step undoes the completed ones.
//!
//! # Examples
//!
//! ```rust
//! use domain_warranty::{ClaimIdentity, PartApprovalLedger, LedgerEntry, PartDecision};
//! use core_kernel::{CenterId, PartId, PartNumber};
//! use chrono::NaiveDate;
//!
//! let id: ClaimIdentity = "WC-5-2025-10-10-001".parse().unwrap();
//! assert_eq!(id.center_id(), CenterId::new(5));
//! assert_eq!(id.date(), NaiveDate::from_ymd_opt(2025, 10, 10).unwrap());
//!
//! let mut ledger = PartApprovalLedger::new(id, vec![LedgerEntry {
//!     part_number: PartNumber::new("BRK-01"),
//!     part_id: PartId::new(1),
//!     quantity: 2,
//!     decision: PartDecision::Undecided,
//! }]);
//! assert!(!ledger.is_fully_reviewed());
//! ledger.bulk_approve(true);
//! assert!(ledger.is_fully_reviewed());
//! ```

pub mod appointment;
pub mod campaign;
pub mod claim;
pub mod error;
pub mod identity;
pub mod inventory;
pub mod ledger;
pub mod part_check;
pub mod ports;
pub mod report;
pub mod saga;
pub mod services;
pub mod vehicle;

pub use appointment::{Appointment, AppointmentStatus, AppointmentWindow};
pub use campaign::{match_campaigns, Campaign, CampaignDraft, CampaignMatch, CampaignStatus};
pub use claim::{Claim, ClaimComment, ClaimQuery, ClaimStatus, NewClaim, TimelineEntry};
pub use error::{ErrorKind, FieldErrors, WarrantyError};
pub use identity::ClaimIdentity;
pub use inventory::{
    InventoryReconciler, PartCatalogEntry, PartsCatalog, ReconciliationPlan, SkipReason,
    SkippedDebit, StockDelta, Warehouse,
};
pub use ledger::{BulkToggle, LedgerCommand, LedgerEntry, PartApprovalLedger, PartDecision};
pub use part_check::{NewPartCheck, PartCheck, PartCheckUpdate};
pub use ports::{
    AppointmentPort, CampaignPort, CatalogPort, ClaimPort, InventoryPort, PartCheckPort, ReportPort,
    VehiclePort, WarrantyPorts, WarrantyStore,
};
pub use report::{CampaignReport, ReportSubmission, ReportSubmissionTracker};
pub use saga::{Compensation, FinalizeSaga};
pub use services::{
    CampaignSummary, ClaimCreated, ClaimLocks, CreateClaimRequest, FinalizeOutcome, FinalizePath,
    FinalizeReport, FinalizeRequest, LedgerView, WarrantyWorkflow, WorkflowConfig,
};
pub use vehicle::Vehicle;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{Fault, InMemoryWarrantyStore, MockOperation};
