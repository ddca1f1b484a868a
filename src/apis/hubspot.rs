use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::types::{DestinationRecord, UpsertPayload};

/// The CRM's marketing event store: full listing plus batch upsert.
#[async_trait]
pub trait MarketingEventStore: Send + Sync {
    async fn list_events(&self) -> Result<Vec<DestinationRecord>>;
    async fn upsert_batch(&self, inputs: &[UpsertPayload]) -> Result<()>;
}

pub struct HubSpotClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    page_limit: u32,
}

impl HubSpotClient {
    pub fn new(config: &Config, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.hubspot_base_url.trim_end_matches('/').to_string(),
            token,
            page_limit: config.page_limit,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<DestinationRecord>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<PagingNext>,
}

#[derive(Debug, Deserialize)]
struct PagingNext {
    after: String,
}

#[async_trait]
impl MarketingEventStore for HubSpotClient {
    #[instrument(skip(self))]
    async fn list_events(&self) -> Result<Vec<DestinationRecord>> {
        let url = format!("{}/marketing/v3/marketing-events", self.base_url);
        let mut records = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .query(&[("limit", self.page_limit.to_string())]);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor)]);
            }

            let page: ListResponse = request.send().await?.error_for_status()?.json().await?;
            records.extend(page.results);

            match page.paging.and_then(|p| p.next) {
                Some(next) => after = Some(next.after),
                None => {
                    debug!(count = records.len(), "pagination completed");
                    break;
                }
            }
        }

        Ok(records)
    }

    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    async fn upsert_batch(&self, inputs: &[UpsertPayload]) -> Result<()> {
        let url = format!("{}/marketing/v3/marketing-events/batch/upsert", self.base_url);
        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "inputs": inputs }))
            .send()
            .await?
            .error_for_status()?;
        debug!("batch upsert accepted");
        Ok(())
    }
}
