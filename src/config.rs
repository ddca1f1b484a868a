use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seasons search endpoint of the event directory
    pub seasons_url: String,
    /// Elasticsearch `_search` endpoint for event documents
    pub events_url: String,
    /// Base URL of the CRM REST API
    pub hubspot_base_url: String,
    /// Mounted secret file holding the CRM access token
    pub token_path: String,
    /// Timeout applied to every outbound request
    pub timeout_seconds: u64,
    /// Page size for the CRM listing call
    pub page_limit: u32,
    /// Result window requested from the event search index
    pub search_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seasons_url: constants::DEFAULT_SEASONS_URL.to_string(),
            events_url: constants::DEFAULT_EVENTS_URL.to_string(),
            hubspot_base_url: constants::DEFAULT_HUBSPOT_BASE_URL.to_string(),
            token_path: constants::DEFAULT_TOKEN_PATH.to_string(),
            timeout_seconds: 30,
            page_limit: 100,
            search_size: 200,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file. A missing file is not an error;
    /// the job then runs entirely on defaults.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            crate::error::SyncError::Config(format!("failed to read config file '{}': {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
