//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants, plus `fake`-backed values for
//! tests that only need something plausible.

use chrono::{Duration, NaiveDate};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{CenterId, Currency, Money, PartId, PartNumber, Vin};
use domain_warranty::{ClaimIdentity, LedgerCommand, NewPartCheck};

/// VIN alphabet: digits and capitals without I, O, Q
const VIN_CHARS: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ0123456789";

/// Strategy for dates between 2020 and the end of 2030
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..4018).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Strategy for well-formed claim ids
pub fn claim_identity_strategy() -> impl Strategy<Value = ClaimIdentity> {
    (1u32..10_000, date_strategy(), 1u32..2_000).prop_map(|(center, date, seq)| {
        ClaimIdentity::new(CenterId::new(center), date, seq).unwrap()
    })
}

/// Strategy for 17-character VINs
pub fn vin_strategy() -> impl Strategy<Value = Vin> {
    prop::collection::vec(prop::sample::select(VIN_CHARS), 17)
        .prop_map(|chars| Vin::new(String::from_utf8_lossy(&chars)))
}

/// Strategy for technician submissions with distinct part numbers
pub fn part_checks_strategy(max_parts: usize) -> impl Strategy<Value = Vec<NewPartCheck>> {
    prop::collection::btree_map(0u64..50, (1u32..10, any::<bool>()), 1..=max_parts.max(1)).prop_map(
        |parts| {
            parts
                .into_iter()
                .map(|(id, (quantity, is_repair))| NewPartCheck {
                    part_number: PartNumber::new(format!("P{:02}", id)),
                    part_id: PartId::new(id),
                    quantity,
                    is_repair,
                })
                .collect()
        },
    )
}

/// Strategy for reviewer commands against a ledger of `len` entries
///
/// Indexes may point one past the end, so strategies also exercise
/// out-of-range commands.
pub fn ledger_command_strategy(len: usize) -> impl Strategy<Value = LedgerCommand> {
    let index = 0..=len;
    prop_oneof![
        (index.clone(), any::<bool>())
            .prop_map(|(index, value)| LedgerCommand::SetApproval { index, value }),
        (index, any::<bool>())
            .prop_map(|(index, value)| LedgerCommand::SetRejection { index, value }),
        any::<bool>().prop_map(|value| LedgerCommand::BulkApprove { value }),
        any::<bool>().prop_map(|value| LedgerCommand::BulkReject { value }),
    ]
}

/// Strategy for (start, end) campaign windows of `0..60` days
pub fn campaign_window_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate, i64)> {
    (date_strategy(), 0i64..60)
        .prop_map(|(start, days)| (start, start + Duration::days(days), days))
}

/// Strategy for non-negative VND prices
pub fn vnd_price_strategy() -> impl Strategy<Value = Money> {
    (0i64..10_000_000).prop_map(|amount| Money::new(Decimal::from(amount), Currency::VND))
}

/// A random VIN
pub fn fake_vin() -> Vin {
    let vin: String = (0..17)
        .map(|_| VIN_CHARS[(0..VIN_CHARS.len()).fake::<usize>()] as char)
        .collect();
    Vin::new(vin)
}

/// A random free-text claim description
pub fn fake_description() -> String {
    Sentence(3..10).fake()
}

pub fn fake_owner_name() -> String {
    Name().fake()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_vin_shape() {
        let vin = fake_vin();
        assert_eq!(vin.as_str().len(), 17);
        assert!(vin.as_str().bytes().all(|b| VIN_CHARS.contains(&b)));
    }

    #[test]
    fn test_fake_description_is_not_blank() {
        assert!(!fake_description().trim().is_empty());
    }

    proptest! {
        #[test]
        fn generated_part_checks_have_distinct_numbers(checks in part_checks_strategy(6)) {
            let mut numbers: Vec<_> = checks.iter().map(|c| c.part_number.clone()).collect();
            numbers.sort();
            numbers.dedup();
            prop_assert_eq!(numbers.len(), checks.len());
        }

        #[test]
        fn generated_vins_are_seventeen_chars(vin in vin_strategy()) {
            prop_assert_eq!(vin.as_str().len(), 17);
        }
    }
}
