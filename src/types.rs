use serde::{Deserialize, Serialize};

use crate::constants;

/// Raw event document as returned from the event search index
pub type RawEventData = serde_json::Value;

/// Supported FIRST program codes. FRC runs on a calendar offset from the
/// other programs, which the season window accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgramCode {
    Frc,
    Ftc,
    Fll,
    Jfll,
}

impl ProgramCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramCode::Frc => "FRC",
            ProgramCode::Ftc => "FTC",
            ProgramCode::Fll => "FLL",
            ProgramCode::Jfll => "JFLL",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "FRC" => Some(ProgramCode::Frc),
            "FTC" => Some(ProgramCode::Ftc),
            "FLL" => Some(ProgramCode::Fll),
            "JFLL" => Some(ProgramCode::Jfll),
            _ => None,
        }
    }

    /// All supported programs, in sync processing order.
    pub fn all() -> [ProgramCode; 4] {
        [
            ProgramCode::Frc,
            ProgramCode::Ftc,
            ProgramCode::Fll,
            ProgramCode::Jfll,
        ]
    }

    pub fn is_flagship(&self) -> bool {
        matches!(self, ProgramCode::Frc)
    }
}

/// The identity key events are matched on. Unique per season and program;
/// also used as the CRM external event/account id.
pub fn event_identity(program: ProgramCode, season_year: i32, event_code: &str) -> String {
    format!("{}{}{}", program.as_str(), season_year, event_code)
}

/// The pair of season years considered current. The flagship program kicks
/// off in the fall for the following year's season, so its records are tagged
/// one year ahead of every other program's.
#[derive(Debug, Clone, Copy)]
pub struct SeasonWindow {
    flagship_year: i32,
}

impl SeasonWindow {
    pub fn new(flagship_year: i32) -> Self {
        Self { flagship_year }
    }

    pub fn season_for(&self, program: ProgramCode) -> i32 {
        if program.is_flagship() {
            self.flagship_year
        } else {
            self.flagship_year - 1
        }
    }

    pub fn contains(&self, program: ProgramCode, season_year: i32) -> bool {
        season_year == self.season_for(program)
    }
}

/// A normalized, validated competition event ready for matching
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEvent {
    pub identity: String,
    pub program_code: ProgramCode,
    pub season_year: i32,
    pub event_code: String,
    pub name: String,
    pub location: String,
    pub start_time: i64,
    pub end_time: i64,
    pub volunteer_url: String,
}

/// One entry of a CRM object's extended property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub name: String,
    pub value: String,
}

impl CustomProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A marketing event record as it exists in the CRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRecord {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub external_event_id: Option<String>,
    #[serde(default)]
    pub event_organizer: Option<String>,
    #[serde(default)]
    pub custom_properties: Vec<CustomProperty>,
}

impl DestinationRecord {
    /// Looks up a property in the extended bag. A key that is missing or
    /// present more than once resolves to nothing rather than failing.
    pub fn custom_property(&self, key: &str) -> Option<&str> {
        let mut matches = self
            .custom_properties
            .iter()
            .filter(|p| p.name == key)
            .map(|p| p.value.as_str());
        match (matches.next(), matches.next()) {
            (Some(value), None) => Some(value),
            _ => None,
        }
    }

    pub fn program_code(&self) -> Option<ProgramCode> {
        self.custom_property(constants::PROP_PROGRAM)
            .and_then(ProgramCode::parse)
    }

    pub fn season_year(&self) -> Option<i32> {
        self.custom_property(constants::PROP_SEASON_YEAR)
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn event_code(&self) -> Option<&str> {
        self.custom_property(constants::PROP_EVENT_CODE)
    }

    /// Identity key derived from the record's own properties. Unresolvable
    /// when any of the three parts is missing or malformed.
    pub fn identity(&self) -> Option<String> {
        let program = self.program_code()?;
        let season_year = self.season_year()?;
        let event_code = self.event_code()?;
        Some(event_identity(program, season_year, event_code))
    }
}

/// One create/update entry for the CRM batch upsert call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub event_organizer: String,
    pub external_account_id: String,
    pub external_event_id: String,
    pub event_name: String,
    pub event_type: ProgramCode,
    pub start_date_time: i64,
    pub end_date_time: i64,
    pub event_url: String,
    pub custom_properties: Vec<CustomProperty>,
}

impl UpsertPayload {
    /// Builds a create payload carrying the canonical event's fields
    /// verbatim. The CRM assigns the object id on create.
    pub fn from_canonical(event: &CanonicalEvent) -> Self {
        Self {
            object_id: None,
            event_organizer: constants::EVENT_ORGANIZER.to_string(),
            external_account_id: event.identity.clone(),
            external_event_id: event.identity.clone(),
            event_name: event.name.clone(),
            event_type: event.program_code,
            start_date_time: event.start_time,
            end_date_time: event.end_time,
            event_url: event.volunteer_url.clone(),
            custom_properties: vec![
                CustomProperty::new(constants::PROP_PROGRAM, event.program_code.as_str()),
                CustomProperty::new(constants::PROP_EVENT_CODE, event.event_code.clone()),
                CustomProperty::new(constants::PROP_SEASON_YEAR, event.season_year.to_string()),
                CustomProperty::new(constants::PROP_LOCATION, event.location.clone()),
            ],
        }
    }
}
