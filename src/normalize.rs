use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::constants;
use crate::types::{event_identity, CanonicalEvent, ProgramCode, RawEventData};

/// Converts one raw event document into its canonical form.
///
/// Missing or unparsable required fields drop the record; the external feed
/// routinely ships partial documents and a drop is not an error. Optional
/// fields fall back to the empty string.
pub fn normalize(raw: &RawEventData) -> Option<CanonicalEvent> {
    let program_code = raw
        .get("event_type")
        .and_then(Value::as_str)
        .and_then(ProgramCode::parse)?;
    let season_year = raw.get("event_season").and_then(int_value)?;
    let event_code = raw.get("event_code").and_then(text_value)?;
    let name = raw.get("event_name").and_then(text_value)?;

    let start_time = raw
        .get("date_start")
        .and_then(Value::as_str)
        .and_then(parse_epoch_millis)?;
    let end_time = raw
        .get("date_end")
        .and_then(Value::as_str)
        .and_then(parse_epoch_millis)?;

    Some(CanonicalEvent {
        identity: event_identity(program_code, season_year, &event_code),
        program_code,
        season_year,
        event_code,
        name,
        location: build_event_location(raw),
        start_time,
        end_time,
        volunteer_url: resolve_volunteer_url(raw),
    })
}

/// Normalizes a whole fetch result, preserving input order. Returns the
/// surviving events along with how many records were dropped.
pub fn normalize_all(raw_events: &[RawEventData]) -> (Vec<CanonicalEvent>, usize) {
    let mut events = Vec::with_capacity(raw_events.len());
    let mut dropped = 0;
    for raw in raw_events {
        match normalize(raw) {
            Some(event) => events.push(event),
            None => {
                debug!("dropping raw event with missing required fields");
                dropped += 1;
            }
        }
    }
    (events, dropped)
}

/// Assembles the multi-line event address. Venue and address lines appear
/// only when non-empty; the final line always carries the region, with city
/// and postal code around it when present.
fn build_event_location(raw: &RawEventData) -> String {
    let mut location = String::new();

    for key in ["event_venue", "event_address1", "event_address2"] {
        let part = trimmed_text(raw, key);
        if !part.is_empty() {
            location.push_str(&part);
            location.push('\n');
        }
    }

    let mut last_line = String::new();
    let city = trimmed_text(raw, "event_city");
    if !city.is_empty() {
        last_line.push_str(&city);
        last_line.push_str(", ");
    }
    last_line.push_str(constants::EVENT_REGION);
    last_line.push_str(&trimmed_text(raw, "event_postal_code"));

    let last_line = last_line.trim();
    if !last_line.is_empty() {
        location.push_str(last_line);
    }

    location
}

/// Prefers the express signup URL over the legacy dashboard deeplink.
fn resolve_volunteer_url(raw: &RawEventData) -> String {
    let express = trimmed_text(raw, "express_volunteer_url");
    if !express.is_empty() {
        return express;
    }
    trimmed_text(raw, "dashboard_volunteer_deeplink")
}

/// Parses an ISO-8601 timestamp into epoch milliseconds. Documents carry
/// either a full RFC 3339 instant or a zone-less local form; the latter is
/// read as UTC.
fn parse_epoch_millis(text: &str) -> Option<i64> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

fn trimmed_text(raw: &RawEventData, key: &str) -> String {
    raw.get(key)
        .and_then(text_value)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// String view of a JSON value; the index is loose about whether codes and
/// postal codes arrive as strings or numbers.
pub(crate) fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn int_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().map(|v| v as i32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_raw() -> Value {
        json!({
            "event_type": "FRC",
            "event_season": 2024,
            "event_code": "ALHU",
            "event_name": "Rocket City Regional",
            "date_start": "2024-03-14T08:00:00Z",
            "date_end": "2024-03-16T18:00:00Z",
            "event_venue": "Von Braun Center",
            "event_address1": "700 Monroe St SW",
            "event_city": "Huntsville",
            "event_postal_code": "35801",
            "express_volunteer_url": "https://example.org/volunteer/alhu"
        })
    }

    #[test]
    fn normalizes_a_complete_record() {
        let event = normalize(&sample_raw()).unwrap();

        assert_eq!(event.identity, "FRC2024ALHU");
        assert_eq!(event.program_code, ProgramCode::Frc);
        assert_eq!(event.season_year, 2024);
        assert_eq!(event.name, "Rocket City Regional");
        assert_eq!(
            event.location,
            "Von Braun Center\n700 Monroe St SW\nHuntsville, Alabama35801"
        );
        assert_eq!(event.volunteer_url, "https://example.org/volunteer/alhu");
    }

    #[test]
    fn season_and_code_accept_string_or_number() {
        let mut raw = sample_raw();
        raw["event_season"] = json!("2024");
        raw["event_postal_code"] = json!(35801);
        let event = normalize(&raw).unwrap();
        assert_eq!(event.season_year, 2024);
        assert_eq!(event.identity, "FRC2024ALHU");
        assert!(event.location.ends_with("Alabama35801"));
    }

    #[test]
    fn records_missing_dates_are_dropped_without_aborting_the_batch() {
        let mut no_start = sample_raw();
        no_start.as_object_mut().unwrap().remove("date_start");
        let mut no_end = sample_raw();
        no_end["date_end"] = json!(null);

        let batch = vec![no_start, sample_raw(), no_end];
        let (events, dropped) = normalize_all(&batch);

        assert_eq!(events.len(), 1);
        assert_eq!(dropped, 2);
        assert_eq!(events[0].identity, "FRC2024ALHU");
    }

    #[test]
    fn unknown_program_code_drops_the_record() {
        let mut raw = sample_raw();
        raw["event_type"] = json!("VEX");
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn unparsable_date_drops_the_record() {
        let mut raw = sample_raw();
        raw["date_start"] = json!("March 14th");
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn zoneless_timestamps_are_read_as_utc() {
        assert_eq!(parse_epoch_millis("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(
            parse_epoch_millis("2024-03-14T08:00:00"),
            parse_epoch_millis("2024-03-14T08:00:00Z")
        );
        assert_eq!(
            parse_epoch_millis("2024-03-14T08:00:00+00:00"),
            parse_epoch_millis("2024-03-14T08:00:00Z")
        );
    }

    #[test]
    fn location_omits_blank_lines_but_keeps_the_region() {
        let raw = json!({
            "event_venue": "Hall A",
            "event_address1": "",
            "event_address2": "  ",
            "event_city": "Springfield",
            "event_postal_code": "12345"
        });
        assert_eq!(build_event_location(&raw), "Hall A\nSpringfield, Alabama12345");

        let no_city = json!({ "event_postal_code": "12345" });
        assert_eq!(build_event_location(&no_city), "Alabama12345");

        let bare = json!({});
        assert_eq!(build_event_location(&bare), "Alabama");
    }

    #[test]
    fn volunteer_url_prefers_express_over_deeplink() {
        let legacy_only = json!({
            "express_volunteer_url": "",
            "dashboard_volunteer_deeplink": "http://x"
        });
        assert_eq!(resolve_volunteer_url(&legacy_only), "http://x");

        let both = json!({
            "express_volunteer_url": "http://y",
            "dashboard_volunteer_deeplink": "http://x"
        });
        assert_eq!(resolve_volunteer_url(&both), "http://y");

        assert_eq!(resolve_volunteer_url(&json!({})), "");
    }

    #[test]
    fn identity_ignores_every_other_field() {
        let mut other = sample_raw();
        other["event_name"] = json!("Different Name");
        other["event_venue"] = json!("Different Venue");

        let a = normalize(&sample_raw()).unwrap();
        let b = normalize(&other).unwrap();
        assert_eq!(a.identity, b.identity);
    }
}
