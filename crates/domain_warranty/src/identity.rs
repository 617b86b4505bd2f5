//! Structured warranty claim identifiers
//!
//! A claim id encodes the service center that opened it, the local day it
//! was opened, and a per-(center, day) sequence:
//!
//! ```text
//! WC-<centerId>-<YYYY-MM-DD>-<seq:03>
//! ```
//!
//! The id is parsed once at the boundary into [`ClaimIdentity`]; everything
//! downstream works with the typed triple.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::CenterId;

use crate::error::WarrantyError;

const PREFIX: &str = "WC";

/// Decomposed claim identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClaimIdentity {
    center_id: CenterId,
    date: NaiveDate,
    seq: u32,
}

impl ClaimIdentity {
    /// Builds an identity; sequences start at 1
    pub fn new(center_id: CenterId, date: NaiveDate, seq: u32) -> Result<Self, WarrantyError> {
        if seq == 0 {
            return Err(WarrantyError::InvalidClaimId(format!(
                "sequence must start at 1 (center {}, {})",
                center_id, date
            )));
        }
        Ok(Self { center_id, date, seq })
    }

    /// The first id of a (center, day); used when sequence allocation fails
    pub fn first_of_day(center_id: CenterId, date: NaiveDate) -> Self {
        Self {
            center_id,
            date,
            seq: 1,
        }
    }

    /// `WC-<center>-<date>`, shared by every claim of that center and day
    pub fn prefix(center_id: CenterId, date: NaiveDate) -> String {
        format!("{}-{}-{}", PREFIX, center_id, date.format("%Y-%m-%d"))
    }

    pub fn center_id(&self) -> CenterId {
        self.center_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// True if this id was issued for the given center and day
    pub fn has_prefix(&self, center_id: CenterId, date: NaiveDate) -> bool {
        self.center_id == center_id && self.date == date
    }
}

impl fmt::Display for ClaimIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:03}",
            Self::prefix(self.center_id, self.date),
            self.seq
        )
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for ClaimIdentity {
    type Err = WarrantyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WarrantyError::InvalidClaimId(s.to_string());

        let parts: Vec<&str> = s.split('-').collect();
        let [prefix, center, year, month, day, seq] = parts.as_slice() else {
            return Err(invalid());
        };

        if *prefix != PREFIX || !all_digits(center) || !all_digits(seq) {
            return Err(invalid());
        }
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        // Three digits, or an unpadded value once the sequence passes 999
        if seq.len() < 3 || (seq.len() > 3 && seq.starts_with('0')) {
            return Err(invalid());
        }

        let center_id: CenterId = center.parse().map_err(|_| invalid())?;
        let date = NaiveDate::parse_from_str(&format!("{}-{}-{}", year, month, day), "%Y-%m-%d")
            .map_err(|_| invalid())?;
        let seq: u32 = seq.parse().map_err(|_| invalid())?;

        Self::new(center_id, date, seq).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClaimIdentity {
    type Error = WarrantyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClaimIdentity> for String {
    fn from(id: ClaimIdentity) -> String {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_wire_format() {
        let id = ClaimIdentity::new(CenterId::new(12), date(2025, 10, 10), 1).unwrap();
        assert_eq!(id.to_string(), "WC-12-2025-10-10-001");

        let second = ClaimIdentity::new(CenterId::new(12), date(2025, 10, 10), 2).unwrap();
        assert_eq!(second.to_string(), "WC-12-2025-10-10-002");
    }

    #[test]
    fn test_parse_decomposes() {
        let id: ClaimIdentity = "WC-5-2025-10-10-001".parse().unwrap();
        assert_eq!(id.center_id(), CenterId::new(5));
        assert_eq!(id.date(), date(2025, 10, 10));
        assert_eq!(id.seq(), 1);
    }

    #[test]
    fn test_large_sequences_print_unpadded() {
        let id = ClaimIdentity::new(CenterId::new(3), date(2025, 1, 2), 1234).unwrap();
        assert_eq!(id.to_string(), "WC-3-2025-01-02-1234");
        assert_eq!(id.to_string().parse::<ClaimIdentity>().unwrap(), id);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "WC-5-2025-10-10",
            "XX-5-2025-10-10-001",
            "WC-+5-2025-10-10-001",
            "WC-5-2025-10-10-01",
            "WC-5-2025-10-10-0001",
            "WC-5-2025-13-10-001",
            "WC-5-25-10-10-001",
            "WC-5-2025-10-10-000",
            "WC-a-2025-10-10-001",
            "WC-5-2025-10-10-001-x",
        ] {
            assert!(bad.parse::<ClaimIdentity>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let id: ClaimIdentity = "WC-7-2025-10-01-042".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"WC-7-2025-10-01-042\"");
        assert!(serde_json::from_str::<ClaimIdentity>("\"WC-7\"").is_err());
    }

    #[test]
    fn test_prefix_matches_ids_of_that_day() {
        let id = ClaimIdentity::new(CenterId::new(12), date(2025, 10, 10), 9).unwrap();
        let prefix = ClaimIdentity::prefix(CenterId::new(12), date(2025, 10, 10));
        assert!(id.to_string().starts_with(&prefix));
        assert!(id.has_prefix(CenterId::new(12), date(2025, 10, 10)));
        assert!(!id.has_prefix(CenterId::new(1), date(2025, 10, 10)));
    }
}
