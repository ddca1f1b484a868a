use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::normalize::int_value;
use crate::types::ProgramCode;

/// Supplies the currently-active season year per program.
#[async_trait]
pub trait SeasonResolver: Send + Sync {
    async fn current_seasons(&self) -> Result<HashMap<ProgramCode, i32>>;
}

pub struct FirstSeasonsApi {
    client: reqwest::Client,
    url: String,
}

impl FirstSeasonsApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            url: config.seasons_url.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SeasonEntry {
    program_code: String,
    // the directory has shipped this both as a string and as a number
    season_year_start: serde_json::Value,
    is_current_season: bool,
}

#[async_trait]
impl SeasonResolver for FirstSeasonsApi {
    #[instrument(skip(self))]
    async fn current_seasons(&self) -> Result<HashMap<ProgramCode, i32>> {
        let entries: Vec<SeasonEntry> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut seasons = HashMap::new();
        for entry in entries.into_iter().filter(|e| e.is_current_season) {
            let program = match ProgramCode::parse(&entry.program_code) {
                Some(program) => program,
                None => continue,
            };
            if let Some(year) = int_value(&entry.season_year_start) {
                seasons.insert(program, year);
            }
        }
        debug!(count = seasons.len(), "resolved current seasons");
        Ok(seasons)
    }
}
