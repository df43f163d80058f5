pub mod fetcher;
pub mod sofascore;

pub use fetcher::{HttpJsonFetcher, JsonFetcher};
pub use sofascore::{RawIncident, Rounds, Season, SofascoreClient, SOFASCORE_BASE_URL};
