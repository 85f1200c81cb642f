//! Runtime settings, read from `PIGEON_*` environment variables (a `.env`
//! file is loaded first if present).

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// `PIGEON_BIND_ADDR`
    pub bind_addr: String,
    /// `PIGEON_DATABASE_URL`
    pub database_url: String,
    /// `PIGEON_MAX_CONNECTIONS`
    pub max_connections: u32,
    /// `PIGEON_CORS_MAX_AGE`, in seconds
    pub cors_max_age: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix("PIGEON"))
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("database_url", "sqlite:pigeon_board.db")?
            .set_default("max_connections", 5)?
            .set_default("cors_max_age", 3600)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
