use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Directory shared with the recorder process
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    /// Minimum plausible recording size in bytes
    #[serde(default = "default_min_bytes")]
    pub min_bytes: u64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_min_bytes() -> u64 {
    10 * 1024
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
