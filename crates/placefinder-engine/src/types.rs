//! Domain types shared by the aggregation, ranking, and caching stages.

use placefinder_core::{CategoryTag, Language, PartnerTier};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Result limit applied when the caller does not ask for one.
pub const DEFAULT_RESULT_LIMIT: usize = 15;

/// Priority class of a venue. Declaration order is ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Premium,
    Allied,
    Standard,
}

impl From<PartnerTier> for Tier {
    fn from(tier: PartnerTier) -> Self {
        match tier {
            PartnerTier::Premium => Tier::Premium,
            PartnerTier::Allied => Tier::Allied,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Premium => write!(f, "premium"),
            Tier::Allied => write!(f, "allied"),
            Tier::Standard => write!(f, "standard"),
        }
    }
}

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Curated partner directory.
    Directory,
    /// Generic place-search provider.
    Search,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Directory => write!(f, "directory"),
            ProviderKind::Search => write!(f, "search"),
        }
    }
}

/// Whether the caller wants tightly local or city-wide results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Proximity,
    #[default]
    General,
}

/// Ordering applied inside each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Quality mode: rating descending.
    Rating,
    /// Distance ascending.
    Proximity,
}

impl SortMode {
    #[must_use]
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Proximity => SortMode::Proximity,
            Intent::General => SortMode::Rating,
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::Rating => write!(f, "rating"),
            SortMode::Proximity => write!(f, "proximity"),
        }
    }
}

/// An immutable venue snapshot.
///
/// Venues are never edited in place; the few stages that derive new data
/// (open-now scoring) consume a venue and return a replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    /// Provider-assigned id, unique within `source`.
    pub id: String,
    pub name: String,
    pub location: Option<Coordinate>,
    pub rating: Option<f64>,
    pub address: String,
    pub tier: Tier,
    pub source: ProviderKind,
    /// Great-circle distance from the request origin. `f64::INFINITY` when
    /// the venue has no usable location.
    pub distance_km: f64,
    pub open_probability: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub types: Vec<String>,
    pub photos: Vec<String>,
}

impl Venue {
    /// Rating used for ordering; unrated venues sort as zero.
    #[must_use]
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    #[must_use]
    pub fn has_distance(&self) -> bool {
        self.distance_km.is_finite()
    }

    #[must_use]
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    #[must_use]
    pub fn with_open_probability(self, probability: f64) -> Self {
        Self {
            open_probability: Some(probability.clamp(0.0, 1.0)),
            ..self
        }
    }
}

/// Dedup key for venue names: trimmed and lower-cased, nothing fuzzier.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Caller-facing knobs for a nearby search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub intent: Intent,
    /// The caller wants places usable right now ("open now", "tonight").
    pub time_sensitive: bool,
    pub language: Language,
    pub result_limit: Option<usize>,
    pub radius_override_meters: Option<u32>,
}

/// A fully specified search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub category: CategoryTag,
    pub intent: Intent,
    pub time_sensitive: bool,
    pub language: Language,
    pub radius_override_meters: Option<u32>,
    pub result_limit: usize,
}

impl SearchRequest {
    #[must_use]
    pub fn new(origin: Coordinate, category: CategoryTag) -> Self {
        Self::from_options(origin, category, SearchOptions::default(), DEFAULT_RESULT_LIMIT)
    }

    /// Builds a request, falling back to `default_limit` when the options
    /// carry no limit or a zero limit.
    #[must_use]
    pub fn from_options(
        origin: Coordinate,
        category: CategoryTag,
        options: SearchOptions,
        default_limit: usize,
    ) -> Self {
        Self {
            origin,
            category,
            intent: options.intent,
            time_sensitive: options.time_sensitive,
            language: options.language,
            radius_override_meters: options.radius_override_meters,
            result_limit: options
                .result_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(default_limit),
        }
    }

    /// "Near me right now": proximity intent on a time-sensitive request.
    #[must_use]
    pub fn is_real_time(&self) -> bool {
        self.intent == Intent::Proximity && self.time_sensitive
    }
}

/// Ranked output of one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub venues: Vec<Venue>,
    pub radius_meters: u32,
    /// More matches existed than the result limit allowed.
    pub truncated: bool,
    /// One provider failed; only the other provider's venues are present.
    pub partial: bool,
    pub sort: SortMode,
    /// Nearest known city, when the origin lies inside the service area.
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(10.4236, -75.5378).unwrap()
    }

    #[test]
    fn tiers_order_by_priority() {
        assert!(Tier::Premium < Tier::Allied);
        assert!(Tier::Allied < Tier::Standard);
    }

    #[test]
    fn normalize_name_trims_and_lowercases() {
        assert_eq!(normalize_name("  Hotel Caribe "), "hotel caribe");
        assert_eq!(normalize_name("hotel caribe "), normalize_name("Hotel Caribe"));
    }

    #[test]
    fn request_defaults_limit_to_fifteen() {
        let request = SearchRequest::new(origin(), CategoryTag::Restaurant);
        assert_eq!(request.result_limit, 15);
        assert_eq!(request.intent, Intent::General);
        assert!(!request.is_real_time());
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let options = SearchOptions {
            result_limit: Some(0),
            ..SearchOptions::default()
        };
        let request = SearchRequest::from_options(origin(), CategoryTag::Bar, options, 20);
        assert_eq!(request.result_limit, 20);
    }

    #[test]
    fn real_time_requires_proximity_and_time_sensitivity() {
        let options = SearchOptions {
            intent: Intent::Proximity,
            time_sensitive: true,
            ..SearchOptions::default()
        };
        let request = SearchRequest::from_options(origin(), CategoryTag::Bar, options, 15);
        assert!(request.is_real_time());

        let general = SearchOptions {
            intent: Intent::General,
            time_sensitive: true,
            ..SearchOptions::default()
        };
        let request = SearchRequest::from_options(origin(), CategoryTag::Bar, general, 15);
        assert!(!request.is_real_time());
    }

    #[test]
    fn sort_mode_follows_intent() {
        assert_eq!(SortMode::for_intent(Intent::Proximity), SortMode::Proximity);
        assert_eq!(SortMode::for_intent(Intent::General), SortMode::Rating);
    }
}
