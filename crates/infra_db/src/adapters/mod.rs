//! Domain Adapters
//!
//! Adapter implementations for the warranty ports, connecting the workflow to
//! the PostgreSQL repositories.
//!
//! # Architecture
//!
//! The adapter:
//! - Implements the domain's port traits
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresWarrantyAdapter;
//! use domain_warranty::ClaimPort;
//!
//! let adapter = PostgresWarrantyAdapter::new(pool);
//! let claim = adapter.get_claim(claim_id).await?;
//! ```

pub mod warranty;

pub use warranty::PostgresWarrantyAdapter;
