//! Parts catalog, warehouse stock, and inventory reconciliation
//!
//! Reconciliation is split in two. [`InventoryReconciler::plan`] is pure: it
//! turns approved quantities into signed stock deltas and records every part
//! it declines to debit. [`InventoryReconciler::apply`] pushes the deltas
//! through the [`InventoryPort`] and reports exactly which ones landed so a
//! caller can credit them back.
//!
//! A service center only draws stock from its own warehouse. A part whose
//! catalog home warehouse is elsewhere is skipped, not failed.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{
    CenterId, Currency, FinalizeAttemptId, Money, OperationMetadata, PartId, PartNumber,
    WarehouseId,
};

use crate::error::WarrantyError;
use crate::identity::ClaimIdentity;
use crate::ports::InventoryPort;
use crate::saga::bounded;

/// A row of the parts catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCatalogEntry {
    pub part_id: PartId,
    pub part_number: PartNumber,
    pub name: String,
    pub unit_price: Money,
    pub home_warehouse_id: WarehouseId,
}

/// Catalog indexed by part number
#[derive(Debug, Clone, Default)]
pub struct PartsCatalog {
    entries: HashMap<PartNumber, PartCatalogEntry>,
    currency: Currency,
}

impl PartsCatalog {
    pub fn from_entries(
        entries: impl IntoIterator<Item = PartCatalogEntry>,
        currency: Currency,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.part_number.clone(), entry))
                .collect(),
            currency,
        }
    }

    pub fn get(&self, part_number: &PartNumber) -> Option<&PartCatalogEntry> {
        self.entries.get(part_number)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stock on hand in one warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub stock: BTreeMap<PartNumber, i64>,
}

impl Warehouse {
    pub fn new(id: WarehouseId) -> Self {
        Self {
            id,
            stock: BTreeMap::new(),
        }
    }

    pub fn quantity(&self, part_number: &PartNumber) -> i64 {
        self.stock.get(part_number).copied().unwrap_or(0)
    }

    /// Applies a signed delta, refusing to go below zero; returns the new level
    pub fn try_apply(&mut self, part_number: &PartNumber, delta: i64) -> Option<i64> {
        let next = self.quantity(part_number).checked_add(delta)?;
        if next < 0 {
            return None;
        }
        self.stock.insert(part_number.clone(), next);
        Some(next)
    }
}

/// A signed change to one part's stock in one warehouse
///
/// A delta carrying a `reference` is applied at most once: the store records
/// the reference with the movement and ignores a repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub warehouse_id: WarehouseId,
    pub part_number: PartNumber,
    pub delta: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl StockDelta {
    pub fn debit(warehouse_id: WarehouseId, part_number: PartNumber, quantity: u32) -> Self {
        Self {
            warehouse_id,
            part_number,
            delta: -i64::from(quantity),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// The delta that undoes this one
    pub fn inverse(&self) -> Self {
        Self {
            warehouse_id: self.warehouse_id,
            part_number: self.part_number.clone(),
            delta: -self.delta,
            reference: self.reference.as_ref().map(|r| format!("{}:undo", r)),
        }
    }
}

/// Why an approved part was not debited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    WarehouseMismatch { home: WarehouseId, center: CenterId },
    NotInCatalog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDebit {
    pub part_number: PartNumber,
    pub quantity: u32,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// The deltas a decision pass will apply, and the parts it will leave alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub claim_id: ClaimIdentity,
    pub debits: Vec<StockDelta>,
    pub skipped: Vec<SkippedDebit>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.debits.is_empty()
    }

    /// A copy whose debits carry `<attempt>:<claim>:<part>` references
    pub fn tagged(&self, attempt: FinalizeAttemptId) -> Self {
        let debits = self
            .debits
            .iter()
            .map(|d| {
                d.clone()
                    .with_reference(format!("{}:{}:{}", attempt, self.claim_id, d.part_number))
            })
            .collect();
        Self {
            claim_id: self.claim_id,
            debits,
            skipped: self.skipped.clone(),
        }
    }
}

/// Deltas that landed before a failure, plus the failure
///
/// `pending` is the delta whose call failed in a way that leaves its outcome
/// unknown (timeout or lost connection); it may or may not have landed.
#[derive(Debug)]
pub struct PartialApply {
    pub applied: Vec<StockDelta>,
    pub pending: Option<StockDelta>,
    pub error: WarrantyError,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryReconciler;

impl InventoryReconciler {
    /// Builds the debit plan for grouped approved quantities
    pub fn plan(
        claim_id: ClaimIdentity,
        approved: &BTreeMap<PartNumber, u32>,
        catalog: &PartsCatalog,
    ) -> ReconciliationPlan {
        let center = claim_id.center_id();
        let mut debits = Vec::new();
        let mut skipped = Vec::new();

        for (part_number, &quantity) in approved {
            let Some(entry) = catalog.get(part_number) else {
                warn!(
                    claim_id = %claim_id,
                    part_number = %part_number,
                    "Approved part missing from catalog; skipping debit"
                );
                skipped.push(SkippedDebit {
                    part_number: part_number.clone(),
                    quantity,
                    reason: SkipReason::NotInCatalog,
                });
                continue;
            };

            if !entry.home_warehouse_id.belongs_to(center) {
                warn!(
                    claim_id = %claim_id,
                    part_number = %part_number,
                    home_warehouse = %entry.home_warehouse_id,
                    center_id = %center,
                    "Part stocked outside the claim's service center; skipping debit"
                );
                skipped.push(SkippedDebit {
                    part_number: part_number.clone(),
                    quantity,
                    reason: SkipReason::WarehouseMismatch {
                        home: entry.home_warehouse_id,
                        center,
                    },
                });
                continue;
            }

            debits.push(StockDelta::debit(entry.home_warehouse_id, part_number.clone(), quantity));
        }

        ReconciliationPlan {
            claim_id,
            debits,
            skipped,
        }
    }

    /// Applies every debit in order, stopping at the first failure
    pub async fn apply(
        plan: &ReconciliationPlan,
        inventory: &dyn InventoryPort,
        step_timeout: Duration,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<StockDelta>, PartialApply> {
        let mut applied = Vec::with_capacity(plan.debits.len());

        for delta in &plan.debits {
            let result = bounded(
                "adjust_stock",
                step_timeout,
                inventory.adjust_stock(delta, metadata.clone()),
            )
            .await;

            match result {
                Ok(level) => {
                    debug!(
                        claim_id = %plan.claim_id,
                        part_number = %delta.part_number,
                        delta = delta.delta,
                        level,
                        "Stock debited"
                    );
                    applied.push(delta.clone());
                }
                Err(error) => {
                    let pending = error.is_transient().then(|| delta.clone());
                    return Err(PartialApply {
                        applied,
                        pending,
                        error: error.into(),
                    });
                }
            }
        }

        Ok(applied)
    }
}
