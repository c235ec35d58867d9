//! Location-aware venue search.
//!
//! Resolves an origin to its city, sizes a search radius for the category,
//! queries a curated partner directory and a generic place search in
//! parallel, merges and ranks the venues (partners first), and caches the
//! ranked result.

pub mod aggregate;
pub mod cache;
pub mod clock;
pub mod engine;
pub mod error;
pub mod gazetteer;
pub mod geo;
pub mod open_now;
pub mod provider;
pub mod radius;
pub mod rank;
pub mod types;

pub use cache::{CacheKey, CacheStats, CacheTtlPolicy, GeoCache, SweeperHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{PlaceFinder, PlaceFinderBuilder};
pub use error::{CacheError, LocationError, ProviderError, SearchError};
pub use gazetteer::{CityAnchor, Gazetteer};
pub use geo::{distance_km, format_distance, Coordinate};
pub use open_now::{HourlyHeuristic, OpenNowEstimator};
pub use provider::{
    DirectoryProvider, DirectoryRecord, PlacesApiClient, SearchProvider, SearchRecord,
    StaticDirectory,
};
pub use radius::{compute_radius, SearchPlan};
pub use rank::Ranker;
pub use types::{
    Intent, ProviderKind, RankedResult, SearchOptions, SearchRequest, SortMode, Tier, Venue,
};
