use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::apis::{EventDirectory, MarketingEventStore, SeasonResolver};
use crate::error::{Result, SyncError};
use crate::matcher::match_events;
use crate::normalize::normalize_all;
use crate::planner::plan_upserts;
use crate::types::{DestinationRecord, ProgramCode, SeasonWindow};

/// What happened to one program's scope during a run
#[derive(Debug, Clone, Serialize)]
pub struct ProgramOutcome {
    pub program: ProgramCode,
    pub season_year: i32,
    pub fetched: usize,
    pub dropped: usize,
    pub updates: usize,
    pub creates: usize,
    pub ambiguous: usize,
    pub submitted: bool,
    /// Scope-level skip reason (fetch failed or returned nothing)
    pub skipped: Option<String>,
    /// Submission failure; counts above still describe the attempted batch
    pub error: Option<String>,
}

impl ProgramOutcome {
    fn new(program: ProgramCode, season_year: i32) -> Self {
        Self {
            program,
            season_year,
            fetched: 0,
            dropped: 0,
            updates: 0,
            creates: 0,
            ambiguous: 0,
            submitted: false,
            skipped: None,
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub programs: Vec<ProgramOutcome>,
}

/// Drives one reconciliation run: list the CRM's records, resolve the season
/// window, then fetch/normalize/match/plan/submit per program.
pub struct SyncRunner {
    seasons: Arc<dyn SeasonResolver>,
    directory: Arc<dyn EventDirectory>,
    store: Arc<dyn MarketingEventStore>,
}

impl SyncRunner {
    pub fn new(
        seasons: Arc<dyn SeasonResolver>,
        directory: Arc<dyn EventDirectory>,
        store: Arc<dyn MarketingEventStore>,
    ) -> Self {
        Self {
            seasons,
            directory,
            store,
        }
    }

    /// Runs the full sync once. A destination-listing or season-resolution
    /// failure aborts the run; per-program failures only skip their scope.
    pub async fn run(&self) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync_run", run_id = %run_id);
        let _enter = span.enter();
        counter!("fia_sync_runs_total").increment(1);

        // Without the full picture of existing records, submitting anything
        // would risk duplicate creation.
        let known = self.store.list_events().await?;
        info!(count = known.len(), "fetched destination records");

        let seasons = self.seasons.current_seasons().await?;
        let flagship_year =
            seasons
                .get(&ProgramCode::Frc)
                .copied()
                .ok_or_else(|| SyncError::Api {
                    message: "season unresolved: no current FRC season".to_string(),
                })?;
        let window = SeasonWindow::new(flagship_year);
        info!(flagship_year, "resolved season window");

        let mut programs = Vec::new();
        for program in ProgramCode::all() {
            programs.push(self.sync_program(program, &window, &known).await);
        }

        info!("sync run complete");
        Ok(SyncReport { run_id, programs })
    }

    async fn sync_program(
        &self,
        program: ProgramCode,
        window: &SeasonWindow,
        known: &[DestinationRecord],
    ) -> ProgramOutcome {
        let season_year = window.season_for(program);
        let mut outcome = ProgramOutcome::new(program, season_year);

        let raw_events = match self.directory.fetch_events(program, season_year).await {
            Ok(raw_events) => raw_events,
            Err(e) => {
                warn!(program = program.as_str(), %e, "event fetch failed, skipping program");
                outcome.skipped = Some(format!("event fetch failed: {e}"));
                return outcome;
            }
        };
        if raw_events.is_empty() {
            warn!(program = program.as_str(), season_year, "no events found");
            outcome.skipped = Some("no events found".to_string());
            return outcome;
        }
        outcome.fetched = raw_events.len();
        counter!("fia_events_fetched_total", "program" => program.as_str())
            .increment(raw_events.len() as u64);

        let (events, dropped) = normalize_all(&raw_events);
        outcome.dropped = dropped;
        if dropped > 0 {
            info!(program = program.as_str(), dropped, "dropped incomplete raw events");
            counter!("fia_events_dropped_total", "program" => program.as_str())
                .increment(dropped as u64);
        }

        let records: Vec<DestinationRecord> = known
            .iter()
            .filter(|record| record.program_code() == Some(program))
            .cloned()
            .collect();

        let matched = match_events(events, records, window);
        outcome.updates = matched.paired.len();
        outcome.creates = matched.unmatched_source.len();
        outcome.ambiguous = matched.ambiguous;
        if matched.ambiguous > 0 {
            counter!("fia_ambiguous_matches_total", "program" => program.as_str())
                .increment(matched.ambiguous as u64);
        }

        let plan = plan_upserts(matched);
        if plan.is_empty() {
            info!(program = program.as_str(), "nothing to submit");
            return outcome;
        }

        match self.store.upsert_batch(&plan).await {
            Ok(()) => {
                info!(
                    program = program.as_str(),
                    updates = outcome.updates,
                    creates = outcome.creates,
                    "batch submitted"
                );
                counter!("fia_upserts_submitted_total", "program" => program.as_str())
                    .increment(plan.len() as u64);
                outcome.submitted = true;
            }
            Err(e) => {
                // one scope failing must not block the remaining programs
                error!(program = program.as_str(), %e, "batch upsert failed");
                outcome.error = Some(format!("batch upsert failed: {e}"));
            }
        }

        outcome
    }
}
