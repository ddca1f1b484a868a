pub mod event_search;
pub mod hubspot;
pub mod seasons;

pub use event_search::{ElasticEventSearch, EventDirectory};
pub use hubspot::{HubSpotClient, MarketingEventStore};
pub use seasons::{FirstSeasonsApi, SeasonResolver};
