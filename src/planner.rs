use crate::matcher::MatchOutcome;
use crate::types::UpsertPayload;

/// Turns a match partition into the ordered batch for the CRM: every pair
/// becomes an in-place update, every unmatched source event a create.
///
/// Updates carry the canonical event's content but keep the two fields the
/// CRM is authoritative for: its opaque object id and the stored organizer.
/// Creates carry the canonical fields verbatim and leave the object id to
/// the CRM. Updates come first, then creates, both in partition order.
pub fn plan_upserts(outcome: MatchOutcome) -> Vec<UpsertPayload> {
    let MatchOutcome {
        paired,
        unmatched_source,
        ..
    } = outcome;

    let mut plan = Vec::with_capacity(paired.len() + unmatched_source.len());

    for (record, event) in paired {
        let mut payload = UpsertPayload::from_canonical(&event);
        payload.object_id = record.object_id;
        if let Some(organizer) = record.event_organizer {
            payload.event_organizer = organizer;
        }
        plan.push(payload);
    }

    for event in unmatched_source {
        plan.push(UpsertPayload::from_canonical(&event));
    }

    plan
}
