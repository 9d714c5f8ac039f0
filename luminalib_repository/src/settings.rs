use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
/// Runtime settings of the repository service, read from environment variables
pub struct Settings {
    pub use_in_memory_db: bool,
    pub db_host: String,
    pub db_username: String,
    pub db_password: String,
    pub luminalib_borrows_url: String,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("use_in_memory_db", false)?
            .set_default("db_host", "127.0.0.1")?
            .set_default("db_username", "postgres")?
            .set_default("db_password", "postgres")?
            .set_default("luminalib_borrows_url", "http://localhost:8081")?
            .set_default("port", 8080)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to deserialize settings")
    }
}
