//! Technician part checks

use serde::{Deserialize, Serialize};

use core_kernel::{PartId, PartNumber, Vin};

use crate::error::FieldErrors;
use crate::identity::ClaimIdentity;

/// A part inspected on a claim; unique per (claim, part number)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCheck {
    pub claim_id: ClaimIdentity,
    pub part_number: PartNumber,
    pub part_id: PartId,
    pub quantity: u32,
    pub is_repair: bool,
    pub approved: bool,
    pub rejected: bool,
}

impl PartCheck {
    /// The claim id as the part-check collaborator names it
    pub fn warranty_id(&self) -> String {
        self.claim_id.to_string()
    }

    /// Applies an update body to this record
    pub fn apply_update(&mut self, update: &PartCheckUpdate) {
        self.quantity = update.quantity;
        self.is_repair = update.is_repair;
        self.part_id = update.part_id;
    }
}

/// Technician input for one inspected part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPartCheck {
    pub part_number: PartNumber,
    pub part_id: PartId,
    pub quantity: u32,
    pub is_repair: bool,
}

impl NewPartCheck {
    pub fn into_check(self, claim_id: ClaimIdentity) -> PartCheck {
        PartCheck {
            claim_id,
            part_number: self.part_number,
            part_id: self.part_id,
            quantity: self.quantity,
            is_repair: self.is_repair,
            approved: false,
            rejected: false,
        }
    }
}

/// Validates one technician submission; part numbers must be unique within it
pub fn validate_checks(checks: &[NewPartCheck]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if checks.is_empty() {
        errors.add("parts", "At least one part must be checked");
    }

    let mut seen = std::collections::HashSet::new();
    for (index, check) in checks.iter().enumerate() {
        if check.part_number.is_blank() {
            errors.add(format!("parts[{}].part_number", index), "Part number is required");
        }
        if check.quantity == 0 {
            errors.add(format!("parts[{}].quantity", index), "Quantity must be at least 1");
        }
        if !seen.insert(&check.part_number) {
            errors.add(
                format!("parts[{}].part_number", index),
                format!("Part {} is listed more than once", check.part_number),
            );
        }
    }
    errors
}

/// Update body sent to the part-check collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartCheckUpdate {
    pub part_number: PartNumber,
    pub warranty_id: String,
    pub vin: Vin,
    pub quantity: u32,
    pub is_repair: bool,
    pub part_id: PartId,
}

impl PartCheckUpdate {
    /// Marks a rejected part as no longer under repair
    pub fn release(
        claim_id: ClaimIdentity,
        vin: &Vin,
        part_number: &PartNumber,
        part_id: PartId,
        quantity: u32,
    ) -> Self {
        Self {
            part_number: part_number.clone(),
            warranty_id: claim_id.to_string(),
            vin: vin.clone(),
            quantity,
            is_repair: false,
            part_id,
        }
    }

    /// The inverse of a release
    pub fn reflag(&self) -> Self {
        Self {
            is_repair: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(part: &str, quantity: u32) -> NewPartCheck {
        NewPartCheck {
            part_number: PartNumber::new(part),
            part_id: PartId::new(1),
            quantity,
            is_repair: true,
        }
    }

    #[test]
    fn test_validate_accepts_distinct_parts() {
        assert!(validate_checks(&[check("A", 1), check("B", 2)]).is_empty());
    }

    #[test]
    fn test_validate_flags_duplicates_and_zero_quantity() {
        let errors = validate_checks(&[check("A", 1), check("A", 0)]);
        assert!(errors.contains("parts[1].part_number"));
        assert!(errors.contains("parts[1].quantity"));
        assert!(!errors.contains("parts[0].part_number"));
    }

    #[test]
    fn test_validate_rejects_empty_submission() {
        assert!(validate_checks(&[]).contains("parts"));
    }

    #[test]
    fn test_release_body_is_camel_case() {
        let id: ClaimIdentity = "WC-5-2025-10-10-001".parse().unwrap();
        let vin = Vin::new("vin1");
        let body = PartCheckUpdate::release(id, &vin, &PartNumber::new("B"), PartId::new(9), 1);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["warrantyId"], "WC-5-2025-10-10-001");
        assert_eq!(json["isRepair"], false);
        assert_eq!(json["partId"], 9);
        assert!(body.reflag().is_repair);
    }
}
