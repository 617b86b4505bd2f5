//! Database Test Utilities
//!
//! Provides a PostgreSQL test container with the warranty schema applied,
//! plus helpers to seed the fixture world and reset data between tests.
//!
//! Tests using these helpers need Docker and are `#[ignore]`d by default:
//!
//! ```bash
//! cargo test -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use crate::fixtures::{CampaignFixtures, CatalogFixtures, VehicleFixtures, INITIAL_STOCK};

const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "warranty_test";

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A PostgreSQL test container with migrations applied
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container and applies the warranty migrations
    pub async fn new() -> TestResult<Self> {
        let container = Postgres::default()
            .with_user(POSTGRES_USER)
            .with_password(POSTGRES_PASSWORD)
            .with_db_name(POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        infra_db::run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Clears all data while preserving the schema
    pub async fn clear_data(&self) -> TestResult<()> {
        sqlx::raw_sql(
            r#"
            TRUNCATE TABLE
                claim_comments, claim_campaigns, claim_timeline, part_checks,
                claims, claim_sequences, campaign_reports, appointments,
                campaigns, stock_movements, warehouse_stock, parts_catalog, vehicles
            CASCADE;
            SELECT setval('campaign_id_seq', 1, false);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts the fixture vehicles, campaigns, catalog, and stock
    pub async fn seed_reference_data(&self) -> TestResult<()> {
        seed_reference_data(&self.pool).await
    }
}

/// Inserts the fixture world into a migrated database
///
/// The campaign id sequence is moved past the seeded ids.
pub async fn seed_reference_data(pool: &PgPool) -> TestResult<()> {
    let mut tx = pool.begin().await?;

    for vehicle in VehicleFixtures::all() {
        sqlx::query("INSERT INTO vehicles (vin, model, owner_name) VALUES ($1, $2, $3)")
            .bind(vehicle.vin.as_str())
            .bind(&vehicle.model)
            .bind(&vehicle.owner_name)
            .execute(&mut *tx)
            .await?;
    }

    for campaign in CampaignFixtures::all() {
        let models: Vec<String> = campaign.models.iter().cloned().collect();
        sqlx::query(
            r#"
            INSERT INTO campaigns (campaign_id, name, models, description, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(i64::try_from(campaign.id.get())?)
        .bind(&campaign.name)
        .bind(&models)
        .bind(&campaign.description)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query("SELECT setval('campaign_id_seq', (SELECT MAX(campaign_id) FROM campaigns))")
        .execute(&mut *tx)
        .await?;

    for part in CatalogFixtures::all() {
        let warehouse = i32::try_from(part.home_warehouse_id.get())?;
        sqlx::query(
            r#"
            INSERT INTO parts_catalog
                (part_number, part_id, name, unit_price, currency, home_warehouse_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(part.part_number.as_str())
        .bind(i64::try_from(part.part_id.get())?)
        .bind(&part.name)
        .bind(part.unit_price.amount())
        .bind(part.unit_price.currency().code())
        .bind(warehouse)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO warehouse_stock (warehouse_id, part_number, quantity) VALUES ($1, $2, $3)",
        )
        .bind(warehouse)
        .bind(part.part_number.as_str())
        .bind(INITIAL_STOCK)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated, seeded test database for a single test
pub async fn create_seeded_test_database() -> TestResult<TestDatabase> {
    let db = TestDatabase::new().await?;
    db.seed_reference_data().await?;
    Ok(db)
}
