use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use fia_sync::apis::{EventDirectory, MarketingEventStore, SeasonResolver};
use fia_sync::error::SyncError;
use fia_sync::normalize::normalize;
use fia_sync::sync::SyncRunner;
use fia_sync::types::{CustomProperty, DestinationRecord, ProgramCode, UpsertPayload};

struct FakeSeasons {
    seasons: HashMap<ProgramCode, i32>,
}

#[async_trait]
impl SeasonResolver for FakeSeasons {
    async fn current_seasons(&self) -> fia_sync::error::Result<HashMap<ProgramCode, i32>> {
        Ok(self.seasons.clone())
    }
}

struct FakeDirectory {
    events: HashMap<(ProgramCode, i32), Vec<Value>>,
}

#[async_trait]
impl EventDirectory for FakeDirectory {
    async fn fetch_events(
        &self,
        program: ProgramCode,
        season_year: i32,
    ) -> fia_sync::error::Result<Vec<Value>> {
        Ok(self
            .events
            .get(&(program, season_year))
            .cloned()
            .unwrap_or_default())
    }
}

struct FakeStore {
    records: Vec<DestinationRecord>,
    fail_listing: bool,
    batches: Mutex<Vec<Vec<UpsertPayload>>>,
}

impl FakeStore {
    fn new(records: Vec<DestinationRecord>) -> Self {
        Self {
            records,
            fail_listing: false,
            batches: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MarketingEventStore for FakeStore {
    async fn list_events(&self) -> fia_sync::error::Result<Vec<DestinationRecord>> {
        if self.fail_listing {
            return Err(SyncError::Api {
                message: "listing unavailable".to_string(),
            });
        }
        Ok(self.records.clone())
    }

    async fn upsert_batch(&self, inputs: &[UpsertPayload]) -> fia_sync::error::Result<()> {
        self.batches.lock().unwrap().push(inputs.to_vec());
        Ok(())
    }
}

fn raw_event(code: &str) -> Value {
    json!({
        "event_type": "FRC",
        "event_season": 2024,
        "event_code": code,
        "event_name": format!("{code} Regional"),
        "date_start": "2024-03-14T08:00:00Z",
        "date_end": "2024-03-16T18:00:00Z",
        "event_venue": "Von Braun Center",
        "event_city": "Huntsville",
        "event_postal_code": "35801",
        "express_volunteer_url": "https://example.org/volunteer"
    })
}

fn runner(
    seasons: HashMap<ProgramCode, i32>,
    events: HashMap<(ProgramCode, i32), Vec<Value>>,
    store: Arc<FakeStore>,
) -> SyncRunner {
    SyncRunner::new(
        Arc::new(FakeSeasons { seasons }),
        Arc::new(FakeDirectory { events }),
        store,
    )
}

fn frc_seasons() -> HashMap<ProgramCode, i32> {
    HashMap::from([(ProgramCode::Frc, 2024), (ProgramCode::Ftc, 2023)])
}

#[tokio::test]
async fn first_run_creates_all_events() -> Result<()> {
    let store = Arc::new(FakeStore::new(Vec::new()));
    let events = HashMap::from([(
        (ProgramCode::Frc, 2024),
        vec![raw_event("ALHU"), raw_event("ALMO")],
    )]);

    let report = runner(frc_seasons(), events, store.clone()).run().await?;

    let frc = &report.programs[0];
    assert_eq!(frc.program, ProgramCode::Frc);
    assert_eq!(frc.season_year, 2024);
    assert_eq!(frc.fetched, 2);
    assert_eq!(frc.creates, 2);
    assert_eq!(frc.updates, 0);
    assert!(frc.submitted);

    // the other programs had nothing to fetch and were skipped
    for outcome in &report.programs[1..] {
        assert_eq!(outcome.skipped.as_deref(), Some("no events found"));
    }

    let batches = store.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    for payload in &batches[0] {
        assert_eq!(payload.object_id, None);
        assert_eq!(payload.event_organizer, "FIRST in Alabama");
    }
    Ok(())
}

#[tokio::test]
async fn rerun_with_unchanged_source_converges_on_the_same_record() -> Result<()> {
    // a record as the CRM would hold it after run N created it
    let known = DestinationRecord {
        object_id: Some("obj-900".to_string()),
        external_event_id: Some("FRC2024ALHU".to_string()),
        event_organizer: Some("FIRST in Alabama".to_string()),
        custom_properties: vec![
            CustomProperty::new("event_program", "FRC"),
            CustomProperty::new("event_season_year", "2024"),
            CustomProperty::new("event_code", "ALHU"),
        ],
    };
    let store = Arc::new(FakeStore::new(vec![known]));
    let events = HashMap::from([((ProgramCode::Frc, 2024), vec![raw_event("ALHU")])]);

    let report = runner(frc_seasons(), events, store.clone()).run().await?;

    let frc = &report.programs[0];
    assert_eq!(frc.updates, 1);
    assert_eq!(frc.creates, 0);
    assert!(frc.submitted);

    let batches = store.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    let payload = &batches[0][0];

    // run N's object id rides along; content equals the canonical fields
    let canonical = normalize(&raw_event("ALHU")).unwrap();
    let mut expected = UpsertPayload::from_canonical(&canonical);
    expected.object_id = Some("obj-900".to_string());
    assert_eq!(payload, &expected);
    Ok(())
}

#[tokio::test]
async fn empty_plan_sends_no_batch() -> Result<()> {
    let store = Arc::new(FakeStore::new(Vec::new()));
    // fetched but useless: both date fields missing, so everything drops
    let crippled = json!({
        "event_type": "FRC",
        "event_season": 2024,
        "event_code": "ALHU",
        "event_name": "ALHU Regional"
    });
    let events = HashMap::from([((ProgramCode::Frc, 2024), vec![crippled])]);

    let report = runner(frc_seasons(), events, store.clone()).run().await?;

    let frc = &report.programs[0];
    assert_eq!(frc.fetched, 1);
    assert_eq!(frc.dropped, 1);
    assert!(!frc.submitted);
    assert!(store.batches.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_flagship_season_aborts_the_run() {
    let store = Arc::new(FakeStore::new(Vec::new()));
    let seasons = HashMap::from([(ProgramCode::Ftc, 2023)]);

    let result = runner(seasons, HashMap::new(), store.clone()).run().await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("season unresolved"), "got: {message}");
    assert!(store.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn listing_failure_aborts_before_any_submission() {
    let mut store = FakeStore::new(Vec::new());
    store.fail_listing = true;
    let store = Arc::new(store);
    let events = HashMap::from([((ProgramCode::Frc, 2024), vec![raw_event("ALHU")])]);

    let result = runner(frc_seasons(), events, store.clone()).run().await;

    assert!(result.is_err());
    assert!(store.batches.lock().unwrap().is_empty());
}
