//! Configuration for the accounts CLI

use core_config::{ConfigError, Environment, FromEnv, env_optional};
use database::postgres::PostgresConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database: PostgresConfig,
    /// Fallback for `--password`, from `ACCOUNTS_PASSWORD`
    pub default_password: Option<String>,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            database: PostgresConfig::from_env()?,
            default_password: env_optional("ACCOUNTS_PASSWORD"),
        })
    }
}
