//! Per-part approval ledger
//!
//! Each repair part carries one [`PartDecision`]. Transitions are pure
//! functions on the ledger; the finalize pass reads the result through
//! [`PartApprovalLedger::rejected_parts`] and
//! [`PartApprovalLedger::approved_quantities`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use core_kernel::{Money, PartId, PartNumber};

use crate::error::WarrantyError;
use crate::identity::ClaimIdentity;
use crate::inventory::PartsCatalog;
use crate::part_check::PartCheck;

/// The decision recorded for one part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartDecision {
    Undecided,
    Approved,
    Rejected,
    /// Stored flags claimed both approved and rejected
    Conflicted,
}

impl PartDecision {
    pub fn from_flags(approved: bool, rejected: bool) -> Self {
        match (approved, rejected) {
            (false, false) => PartDecision::Undecided,
            (true, false) => PartDecision::Approved,
            (false, true) => PartDecision::Rejected,
            (true, true) => PartDecision::Conflicted,
        }
    }

    /// (approved, rejected)
    pub fn flags(&self) -> (bool, bool) {
        match self {
            PartDecision::Undecided => (false, false),
            PartDecision::Approved => (true, false),
            PartDecision::Rejected => (false, true),
            PartDecision::Conflicted => (true, true),
        }
    }

    /// Exactly one of approved/rejected is set
    pub fn is_reviewed(&self) -> bool {
        matches!(self, PartDecision::Approved | PartDecision::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub part_number: PartNumber,
    pub part_id: PartId,
    pub quantity: u32,
    pub decision: PartDecision,
}

/// Which bulk toggle is currently on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkToggle {
    #[default]
    Off,
    ApproveAll,
    RejectAll,
}

/// One reviewer action against the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LedgerCommand {
    SetApproval { index: usize, value: bool },
    SetRejection { index: usize, value: bool },
    BulkApprove { value: bool },
    BulkReject { value: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartApprovalLedger {
    claim_id: ClaimIdentity,
    entries: Vec<LedgerEntry>,
    bulk: BulkToggle,
}

impl PartApprovalLedger {
    pub fn new(claim_id: ClaimIdentity, entries: Vec<LedgerEntry>) -> Self {
        Self {
            claim_id,
            entries,
            bulk: BulkToggle::Off,
        }
    }

    /// Builds the ledger from the parts flagged for repair, keeping their order
    pub fn from_part_checks(claim_id: ClaimIdentity, checks: &[PartCheck]) -> Self {
        let entries = checks
            .iter()
            .filter(|check| check.is_repair)
            .map(|check| LedgerEntry {
                part_number: check.part_number.clone(),
                part_id: check.part_id,
                quantity: check.quantity,
                decision: PartDecision::from_flags(check.approved, check.rejected),
            })
            .collect();
        Self::new(claim_id, entries)
    }

    pub fn claim_id(&self) -> ClaimIdentity {
        self.claim_id
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn bulk(&self) -> BulkToggle {
        self.bulk
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut LedgerEntry, WarrantyError> {
        let len = self.entries.len();
        self.entries.get_mut(index).ok_or_else(|| {
            WarrantyError::validation(
                "index",
                format!("Part index {} is out of range (ledger has {} parts)", index, len),
            )
        })
    }

    /// Sets or clears approval on one part; approving clears any rejection
    pub fn set_approval(&mut self, index: usize, value: bool) -> Result<(), WarrantyError> {
        let entry = self.entry_mut(index)?;
        entry.decision = if value {
            PartDecision::Approved
        } else {
            PartDecision::Undecided
        };
        self.bulk = BulkToggle::Off;
        Ok(())
    }

    /// Sets or clears rejection on one part; rejecting clears any approval
    pub fn set_rejection(&mut self, index: usize, value: bool) -> Result<(), WarrantyError> {
        let entry = self.entry_mut(index)?;
        entry.decision = if value {
            PartDecision::Rejected
        } else {
            PartDecision::Undecided
        };
        self.bulk = BulkToggle::Off;
        Ok(())
    }

    /// Overwrites every entry; turning it on switches bulk reject off
    pub fn bulk_approve(&mut self, value: bool) {
        self.overwrite_all(if value { PartDecision::Approved } else { PartDecision::Undecided });
        self.bulk = if value { BulkToggle::ApproveAll } else { BulkToggle::Off };
    }

    /// Overwrites every entry; turning it on switches bulk approve off
    pub fn bulk_reject(&mut self, value: bool) {
        self.overwrite_all(if value { PartDecision::Rejected } else { PartDecision::Undecided });
        self.bulk = if value { BulkToggle::RejectAll } else { BulkToggle::Off };
    }

    fn overwrite_all(&mut self, decision: PartDecision) {
        for entry in &mut self.entries {
            entry.decision = decision;
        }
    }

    pub fn apply(&mut self, command: LedgerCommand) -> Result<(), WarrantyError> {
        match command {
            LedgerCommand::SetApproval { index, value } => self.set_approval(index, value),
            LedgerCommand::SetRejection { index, value } => self.set_rejection(index, value),
            LedgerCommand::BulkApprove { value } => {
                self.bulk_approve(value);
                Ok(())
            }
            LedgerCommand::BulkReject { value } => {
                self.bulk_reject(value);
                Ok(())
            }
        }
    }

    /// Applies commands in order; the ledger is untouched if any command fails
    pub fn apply_all(&mut self, commands: &[LedgerCommand]) -> Result<(), WarrantyError> {
        let mut next = self.clone();
        for command in commands {
            next.apply(*command)?;
        }
        *self = next;
        Ok(())
    }

    /// Every part has exactly one of approved/rejected set
    pub fn is_fully_reviewed(&self) -> bool {
        self.entries.iter().all(|entry| entry.decision.is_reviewed())
    }

    /// Indexes still needing a decision
    pub fn unreviewed(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.decision.is_reviewed())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn rejected_parts(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.decision == PartDecision::Rejected)
    }

    /// Approved quantities grouped by part number
    pub fn approved_quantities(&self) -> BTreeMap<PartNumber, u32> {
        let mut grouped = BTreeMap::new();
        for entry in self.entries.iter().filter(|e| e.decision == PartDecision::Approved) {
            *grouped.entry(entry.part_number.clone()).or_insert(0u32) += entry.quantity;
        }
        grouped
    }

    /// Sum of unit price times quantity over approved parts
    pub fn total_approved_cost(&self, catalog: &PartsCatalog) -> Result<Money, WarrantyError> {
        let mut total = Money::zero(catalog.currency());
        for (part_number, quantity) in self.approved_quantities() {
            let entry = catalog
                .get(&part_number)
                .ok_or_else(|| WarrantyError::not_found("Part", &part_number))?;
            total = total.checked_add(&entry.unit_price.times(quantity))?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::PartCatalogEntry;
    use core_kernel::{Currency, WarehouseId};
    use rust_decimal_macros::dec;

    fn claim_id() -> ClaimIdentity {
        "WC-5-2025-10-10-001".parse().unwrap()
    }

    fn entry(part: &str, quantity: u32) -> LedgerEntry {
        LedgerEntry {
            part_number: PartNumber::new(part),
            part_id: PartId::new(1),
            quantity,
            decision: PartDecision::Undecided,
        }
    }

    fn catalog() -> PartsCatalog {
        PartsCatalog::from_entries(
            ["A", "B"].into_iter().map(|p| PartCatalogEntry {
                part_id: PartId::new(1),
                part_number: PartNumber::new(p),
                name: p.to_string(),
                unit_price: Money::new(dec!(500000), Currency::VND),
                home_warehouse_id: WarehouseId::new(5),
            }),
            Currency::VND,
        )
    }

    #[test]
    fn test_approval_clears_rejection() {
        let mut ledger = PartApprovalLedger::new(claim_id(), vec![entry("A", 1)]);
        ledger.set_rejection(0, true).unwrap();
        ledger.set_approval(0, true).unwrap();
        assert_eq!(ledger.entries()[0].decision, PartDecision::Approved);

        ledger.set_approval(0, false).unwrap();
        assert_eq!(ledger.entries()[0].decision, PartDecision::Undecided);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut ledger = PartApprovalLedger::new(claim_id(), vec![entry("A", 1)]);
        let err = ledger.set_approval(3, true).unwrap_err();
        assert!(matches!(err, WarrantyError::Validation(ref f) if f.contains("index")));
    }

    #[test]
    fn test_bulk_toggles_are_exclusive() {
        let mut ledger = PartApprovalLedger::new(claim_id(), vec![entry("A", 1), entry("B", 1)]);
        ledger.bulk_approve(true);
        assert_eq!(ledger.bulk(), BulkToggle::ApproveAll);
        ledger.bulk_reject(true);
        assert_eq!(ledger.bulk(), BulkToggle::RejectAll);
        assert!(ledger.entries().iter().all(|e| e.decision == PartDecision::Rejected));
        ledger.bulk_reject(false);
        assert_eq!(ledger.bulk(), BulkToggle::Off);
        assert!(!ledger.is_fully_reviewed());
    }

    #[test]
    fn test_conflicted_entry_is_not_reviewed() {
        let id = claim_id();
        let check = PartCheck {
            claim_id: id,
            part_number: PartNumber::new("A"),
            part_id: PartId::new(1),
            quantity: 1,
            is_repair: true,
            approved: true,
            rejected: true,
        };
        let ledger = PartApprovalLedger::from_part_checks(id, &[check]);
        assert_eq!(ledger.entries()[0].decision, PartDecision::Conflicted);
        assert!(!ledger.is_fully_reviewed());
        assert_eq!(ledger.unreviewed(), vec![0]);
    }

    #[test]
    fn test_only_repair_parts_enter_the_ledger() {
        let id = claim_id();
        let mk = |p: &str, repair: bool| PartCheck {
            claim_id: id,
            part_number: PartNumber::new(p),
            part_id: PartId::new(1),
            quantity: 1,
            is_repair: repair,
            approved: false,
            rejected: false,
        };
        let ledger = PartApprovalLedger::from_part_checks(id, &[mk("A", true), mk("B", false)]);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_total_cost_groups_duplicates() {
        let mut ledger =
            PartApprovalLedger::new(claim_id(), vec![entry("A", 2), entry("B", 1), entry("A", 1)]);
        ledger.set_approval(0, true).unwrap();
        ledger.set_rejection(1, true).unwrap();
        ledger.set_approval(2, true).unwrap();

        assert_eq!(ledger.approved_quantities().get(&PartNumber::new("A")), Some(&3));
        assert_eq!(ledger.total_approved_cost(&catalog()).unwrap().amount(), dec!(1500000));
        assert_eq!(ledger.rejected_parts().count(), 1);
    }

    #[test]
    fn test_total_cost_errors_on_catalog_miss() {
        let mut ledger = PartApprovalLedger::new(claim_id(), vec![entry("Z", 1)]);
        ledger.bulk_approve(true);
        assert!(matches!(
            ledger.total_approved_cost(&catalog()),
            Err(WarrantyError::NotFound { .. })
        ));
    }

    #[test]
    fn test_apply_all_is_atomic() {
        let mut ledger = PartApprovalLedger::new(claim_id(), vec![entry("A", 1)]);
        let result = ledger.apply_all(&[
            LedgerCommand::SetApproval { index: 0, value: true },
            LedgerCommand::SetRejection { index: 9, value: true },
        ]);
        assert!(result.is_err());
        assert_eq!(ledger.entries()[0].decision, PartDecision::Undecided);
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: LedgerCommand =
            serde_json::from_str(r#"{"action":"set_approval","index":0,"value":true}"#).unwrap();
        assert_eq!(cmd, LedgerCommand::SetApproval { index: 0, value: true });
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::inventory::PartCatalogEntry;
    use core_kernel::{Currency, WarehouseId};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn decision() -> impl Strategy<Value = PartDecision> {
        prop_oneof![
            Just(PartDecision::Undecided),
            Just(PartDecision::Approved),
            Just(PartDecision::Rejected),
            Just(PartDecision::Conflicted),
        ]
    }

    fn entries() -> impl Strategy<Value = Vec<LedgerEntry>> {
        prop::collection::vec((0usize..4, 1u32..5, decision()), 0..10).prop_map(|items| {
            items
                .into_iter()
                .map(|(part, quantity, decision)| LedgerEntry {
                    part_number: PartNumber::new(format!("P{}", part)),
                    part_id: PartId::new(part as u64),
                    quantity,
                    decision,
                })
                .collect()
        })
    }

    fn catalog() -> PartsCatalog {
        PartsCatalog::from_entries(
            (0..4).map(|i| PartCatalogEntry {
                part_id: PartId::new(i),
                part_number: PartNumber::new(format!("P{}", i)),
                name: String::new(),
                unit_price: Money::new(Decimal::from(1000 * (i + 1)), Currency::VND),
                home_warehouse_id: WarehouseId::new(1),
            }),
            Currency::VND,
        )
    }

    proptest! {
        #[test]
        fn fully_reviewed_iff_each_entry_has_exactly_one_flag(entries in entries()) {
            let expected = entries.iter().all(|e| {
                let (a, r) = e.decision.flags();
                a ^ r
            });
            let ledger = PartApprovalLedger::new("WC-1-2025-10-10-001".parse().unwrap(), entries);
            prop_assert_eq!(ledger.is_fully_reviewed(), expected);
        }

        #[test]
        fn total_cost_ignores_entry_order(entries in entries(), seed in any::<u64>()) {
            let id: ClaimIdentity = "WC-1-2025-10-10-001".parse().unwrap();
            let mut shuffled = entries.clone();
            // deterministic rotation stands in for a shuffle
            if !shuffled.is_empty() {
                let k = (seed as usize) % shuffled.len();
                shuffled.rotate_left(k);
                shuffled.reverse();
            }

            let a = PartApprovalLedger::new(id, entries);
            let b = PartApprovalLedger::new(id, shuffled);
            let catalog = catalog();

            let first = a.total_approved_cost(&catalog).unwrap();
            prop_assert_eq!(first, b.total_approved_cost(&catalog).unwrap());
            prop_assert_eq!(first, a.total_approved_cost(&catalog).unwrap());
        }

        #[test]
        fn pure_transitions_never_conflict(
            commands in prop::collection::vec(
                prop_oneof![
                    (0usize..3, any::<bool>())
                        .prop_map(|(index, value)| LedgerCommand::SetApproval { index, value }),
                    (0usize..3, any::<bool>())
                        .prop_map(|(index, value)| LedgerCommand::SetRejection { index, value }),
                    any::<bool>().prop_map(|value| LedgerCommand::BulkApprove { value }),
                    any::<bool>().prop_map(|value| LedgerCommand::BulkReject { value }),
                ],
                0..20,
            )
        ) {
            let mut ledger = PartApprovalLedger::new(
                "WC-1-2025-10-10-001".parse().unwrap(),
                (0..3).map(|i| LedgerEntry {
                    part_number: PartNumber::new(format!("P{}", i)),
                    part_id: PartId::new(i as u64),
                    quantity: 1,
                    decision: PartDecision::Undecided,
                }).collect(),
            );
            for command in commands {
                ledger.apply(command).unwrap();
            }
            prop_assert!(ledger.entries().iter().all(|e| e.decision != PartDecision::Conflicted));
        }
    }
}
