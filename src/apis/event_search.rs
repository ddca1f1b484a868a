use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::types::{ProgramCode, RawEventData};

/// Supplies raw event documents for one program and season.
#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn fetch_events(&self, program: ProgramCode, season_year: i32)
        -> Result<Vec<RawEventData>>;
}

pub struct ElasticEventSearch {
    client: reqwest::Client,
    url: String,
    size: u32,
}

impl ElasticEventSearch {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            url: config.events_url.clone(),
            size: config.search_size,
        })
    }
}

#[async_trait]
impl EventDirectory for ElasticEventSearch {
    #[instrument(skip(self), fields(program = program.as_str()))]
    async fn fetch_events(
        &self,
        program: ProgramCode,
        season_year: i32,
    ) -> Result<Vec<RawEventData>> {
        let body = json!({
            "query": {
                "bool": {
                    "filter": [
                        { "term": { "event_type": program.as_str() } },
                        { "term": { "event_season": season_year } }
                    ]
                }
            }
        });

        let response: Value = self
            .client
            .get(&self.url)
            .query(&[("size", self.size.to_string())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // A response without hits is "no events", not a failure.
        let events: Vec<RawEventData> = match response.pointer("/hits/hits").and_then(Value::as_array) {
            Some(hits) => hits
                .iter()
                .filter_map(|hit| hit.get("_source").cloned())
                .collect(),
            None => {
                warn!("search response had no hits section");
                Vec::new()
            }
        };
        debug!(count = events.len(), "fetched event documents");
        Ok(events)
    }
}
