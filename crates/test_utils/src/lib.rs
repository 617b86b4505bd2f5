//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! warranty workflow test suite.
//!
//! # Modules
//!
//! - `fixtures`: The standard service center, vehicles, campaigns, and parts catalog
//! - `builders`: Builder patterns for claims, part checks, and campaign drafts
//! - `database`: PostgreSQL test container and reference-data seeding
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based strategies and `fake` data

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
