//! API configuration

use std::time::Duration;

use config::ConfigError;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Timezone};
use domain_warranty::WorkflowConfig;

/// API configuration
///
/// Every field can be overridden by an `API_`-prefixed environment variable
/// (`API_PORT`, `API_STEP_TIMEOUT_MS`, `API_TIMEZONE`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Deadline for each collaborator call made by the workflow
    pub step_timeout_ms: u64,
    /// Currency of catalog prices (ISO 4217)
    pub currency: String,
    /// IANA timezone that decides the service's "today"
    pub timezone: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/warranty".to_string(),
            db_max_connections: 10,
            log_level: "info".to_string(),
            log_json: false,
            step_timeout_ms: 5_000,
            currency: "VND".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment, on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default())?)
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The workflow settings this configuration describes
    pub fn workflow_config(&self) -> Result<WorkflowConfig, ConfigError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e| ConfigError::Message(format!("currency: {}", e)))?;
        let timezone: Timezone = self
            .timezone
            .parse()
            .map_err(|e| ConfigError::Message(format!("timezone: {}", e)))?;
        if self.step_timeout_ms == 0 {
            return Err(ConfigError::Message("step_timeout_ms must be positive".to_string()));
        }

        Ok(WorkflowConfig {
            step_timeout: Duration::from_millis(self.step_timeout_ms),
            currency,
            timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workflow_config() {
        let config = ApiConfig::default().workflow_config().unwrap();
        assert_eq!(config.step_timeout, Duration::from_secs(5));
        assert_eq!(config.currency, Currency::VND);
        assert_eq!(config.timezone, "Asia/Ho_Chi_Minh".parse::<Timezone>().unwrap());
    }

    #[test]
    fn test_bad_timezone_is_rejected() {
        let config = ApiConfig {
            timezone: "Mars/Olympus".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.workflow_config().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = ApiConfig {
            step_timeout_ms: 0,
            ..ApiConfig::default()
        };
        assert!(config.workflow_config().is_err());
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(ApiConfig::default().server_addr(), "0.0.0.0:8080");
    }
}
