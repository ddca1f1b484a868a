/// Fixed identity of the operating organization. The CRM owns this field for
/// existing records; it is only written as-is on newly created events.
pub const EVENT_ORGANIZER: &str = "FIRST in Alabama";

/// Region line appended to every assembled event location.
pub const EVENT_REGION: &str = "Alabama";

// Custom property names on the CRM marketing event object
pub const PROP_PROGRAM: &str = "event_program";
pub const PROP_EVENT_CODE: &str = "event_code";
pub const PROP_SEASON_YEAR: &str = "event_season_year";
pub const PROP_LOCATION: &str = "event_location";

// Default endpoints and paths, overridable via config.toml
pub const DEFAULT_SEASONS_URL: &str = "https://my.firstinspires.org/usfirstapi/seasons/search";
pub const DEFAULT_EVENTS_URL: &str = "https://es02.firstinspires.org/events/_search";
pub const DEFAULT_HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_TOKEN_PATH: &str = "/run/secrets/HUBSPOT_API_TOKEN";
