use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_OIKOTIE_URL: &str = "https://asunnot.oikotie.fi/vuokra-asunnot";
pub const DEFAULT_LUMO_URL: &str = "https://lumo.fi/vuokra-asunnot";
const DEFAULT_LEDGER_PATH: &str = "data/listings.csv";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; rental-tracker/1.0; +you@example.com)";

/// Runtime settings: built-in defaults overlaid by `LISTINGS_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub oikotie_url: String,
    pub lumo_url: String,
    pub ledger_path: PathBuf,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub fetch_attempts: u32,
    pub retry_delay_ms: u64,
    pub politeness_delay_ms: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("oikotie_url", DEFAULT_OIKOTIE_URL)?
            .set_default("lumo_url", DEFAULT_LUMO_URL)?
            .set_default("ledger_path", DEFAULT_LEDGER_PATH)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", 30)?
            .set_default("fetch_attempts", 3)?
            .set_default("retry_delay_ms", 2000)?
            .set_default("politeness_delay_ms", 2000)?
            .add_source(Environment::with_prefix("LISTINGS").try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            oikotie_url: DEFAULT_OIKOTIE_URL.to_string(),
            lumo_url: DEFAULT_LUMO_URL.to_string(),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            fetch_attempts: 3,
            retry_delay_ms: 2000,
            politeness_delay_ms: 2000,
        }
    }
}
