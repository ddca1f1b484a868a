use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::{CanonicalEvent, DestinationRecord, SeasonWindow};

/// Partition of one season window's events against the CRM's records.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Record/event pairs that will become in-place updates
    pub paired: Vec<(DestinationRecord, CanonicalEvent)>,
    /// Canonical events with no matching record; candidates for creation
    pub unmatched_source: Vec<CanonicalEvent>,
    /// In-window records with no matching event; untouched this run
    pub unmatched_destination: Vec<DestinationRecord>,
    /// Records skipped because several events claimed their identity key
    pub ambiguous: usize,
}

/// Matches canonical events against destination records by identity key.
///
/// Only records tagged inside the season window take part; everything else
/// stays untouched in the CRM. Both inputs are walked in their original
/// order, so identical inputs always produce the identical partition.
pub fn match_events(
    events: Vec<CanonicalEvent>,
    records: Vec<DestinationRecord>,
    window: &SeasonWindow,
) -> MatchOutcome {
    let in_window: Vec<DestinationRecord> = records
        .into_iter()
        .filter(|record| match (record.program_code(), record.season_year()) {
            (Some(program), Some(season)) => window.contains(program, season),
            // unresolved season tags exclude the record from this run
            _ => false,
        })
        .collect();

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (position, event) in events.iter().enumerate() {
        index.entry(event.identity.clone()).or_default().push(position);
    }

    let mut consumed = vec![false; events.len()];
    let mut pairings: Vec<(DestinationRecord, usize)> = Vec::new();
    let mut unmatched_destination = Vec::new();
    let mut ambiguous = 0;

    for record in in_window {
        let key = record.identity();
        let candidates: Vec<usize> = key
            .as_deref()
            .and_then(|k| index.get(k))
            .map(|positions| {
                positions
                    .iter()
                    .copied()
                    .filter(|&position| !consumed[position])
                    .collect()
            })
            .unwrap_or_default();

        match candidates.as_slice() {
            [] => {
                debug!(
                    object_id = record.object_id.as_deref().unwrap_or("-"),
                    "no source event for record"
                );
                unmatched_destination.push(record);
            }
            [position] => {
                consumed[*position] = true;
                pairings.push((record, *position));
            }
            _ => {
                warn!(
                    key = key.as_deref().unwrap_or("-"),
                    candidates = candidates.len(),
                    "ambiguous identity match, record left as-is this run"
                );
                ambiguous += 1;
            }
        }
    }

    let mut slots: Vec<Option<CanonicalEvent>> = events.into_iter().map(Some).collect();
    let mut paired = Vec::with_capacity(pairings.len());
    for (record, position) in pairings {
        if let Some(event) = slots[position].take() {
            paired.push((record, event));
        }
    }
    let unmatched_source: Vec<CanonicalEvent> = slots.into_iter().flatten().collect();

    MatchOutcome {
        paired,
        unmatched_source,
        unmatched_destination,
        ambiguous,
    }
}
