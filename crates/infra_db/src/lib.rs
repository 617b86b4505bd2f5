//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the warranty workflow using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories speak in row types
//! and [`DatabaseError`]; [`PostgresWarrantyAdapter`] sits on top of them and
//! implements the ports declared by `domain_warranty`, so the workflow never
//! sees SQL.
//!
//! Schema changes live in `migrations/` and are applied with
//! [`run_migrations`] at startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, run_migrations, PostgresWarrantyAdapter};
//!
//! let pool = create_pool_from_url("postgres://localhost/warranty").await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresWarrantyAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresWarrantyAdapter;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
