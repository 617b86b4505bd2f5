//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_warranty::{Claim, ClaimStatus, ErrorKind, WarrantyError};

/// Asserts a money value by amount and currency
///
/// # Panics
///
/// Panics if the currencies differ or the amounts are not equal
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts a money amount regardless of scale (500000 == 500000.00)
pub fn assert_amount(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount().normalize(),
        expected.normalize(),
        "Expected amount {}, got {}",
        expected,
        actual
    );
}

/// Asserts the claim's realized statuses, in order
pub fn assert_timeline(claim: &Claim, expected: &[ClaimStatus]) {
    let actual: Vec<ClaimStatus> = claim.timeline.iter().map(|e| e.status).collect();
    assert_eq!(actual, expected, "Timeline mismatch for claim {}", claim.id);
    assert!(
        claim.is_timeline_consistent(),
        "Timeline of claim {} is inconsistent: {:?}",
        claim.id,
        claim.timeline
    );
}

/// Asserts that a validation error names `field`
pub fn assert_field_error(err: &WarrantyError, field: &str) {
    match err {
        WarrantyError::Validation(fields) => assert!(
            fields.contains(field),
            "Expected a validation error on {:?}, got {}",
            field,
            fields
        ),
        other => panic!("Expected a validation error on {:?}, got {:?}", field, other),
    }
}

/// Asserts the retry classification of an error
pub fn assert_kind(err: &WarrantyError, expected: ErrorKind) {
    assert_eq!(err.kind(), expected, "Unexpected error kind for {:?}", err);
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!(
                "Expected Err matching {}, got Ok({:?})",
                stringify!($pattern),
                value
            ),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}
