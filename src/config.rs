use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub broadcast_interval_secs: u64,
    pub violation_interval_secs: u64,
    pub service_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://slatrack.db?mode=rwc".to_string());

        let broadcast_interval_secs = env::var("BROADCAST_INTERVAL_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidInterval("BROADCAST_INTERVAL_SECS"))?;

        let violation_interval_secs = env::var("VIOLATION_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidInterval("VIOLATION_INTERVAL_SECS"))?;

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "slatrack".to_string());

        Ok(Config {
            database_url,
            broadcast_interval_secs,
            violation_interval_secs,
            service_name,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be a positive integer")]
    InvalidInterval(&'static str),
}
