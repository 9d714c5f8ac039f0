use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
/// Runtime settings of the recommendations service, read from environment variables
pub struct Settings {
    pub luminalib_repository_url: String,
    pub luminalib_borrows_url: String,
    /// Text generation endpoint, review summaries use the template when not set
    pub llm_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_max_retries: u32,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("luminalib_repository_url", "http://localhost:8080")?
            .set_default("luminalib_borrows_url", "http://localhost:8081")?
            .set_default("llm_max_retries", 1)?
            .set_default("port", 8080)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to deserialize settings")
    }
}
