//! Fan-out to both providers, then merge into one deduplicated venue list.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use placefinder_core::{CategoryTag, Language};

use crate::error::ProviderError;
use crate::geo::{distance_km, Coordinate};
use crate::provider::{DirectoryProvider, DirectoryRecord, SearchProvider, SearchRecord};
use crate::types::{normalize_name, ProviderKind, SortMode, Tier, Venue};

pub const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_millis(2_000);
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_millis(5_000);

/// What to ask both providers for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchPlan {
    pub origin: Coordinate,
    pub category: CategoryTag,
    pub radius_meters: u32,
    pub sort: SortMode,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    pub venues: Vec<Venue>,
    /// One provider failed and its venues are missing.
    pub partial: bool,
}

pub struct Aggregator {
    directory: Arc<dyn DirectoryProvider>,
    search: Arc<dyn SearchProvider>,
    directory_timeout: Duration,
    search_timeout: Duration,
}

impl Aggregator {
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            directory,
            search,
            directory_timeout: DEFAULT_DIRECTORY_TIMEOUT,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, directory: Duration, search: Duration) -> Self {
        self.directory_timeout = directory;
        self.search_timeout = search;
        self
    }

    /// Queries both providers concurrently and merges what comes back.
    ///
    /// A single failing or slow provider degrades the answer to `partial`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::AllProvidersUnavailable`] when both fail.
    pub async fn fetch(&self, plan: &FetchPlan) -> Result<Aggregated, ProviderError> {
        let directory_call = bounded(
            ProviderKind::Directory,
            self.directory_timeout,
            self.directory
                .query(plan.origin, plan.category, plan.radius_meters),
        );
        let search_call = bounded(
            ProviderKind::Search,
            self.search_timeout,
            self.search.query(
                plan.origin,
                plan.category,
                plan.radius_meters,
                plan.sort,
                plan.language,
            ),
        );

        let (directory, search) = tokio::join!(directory_call, search_call);

        let (directory, search, partial) = match (directory, search) {
            (Ok(directory), Ok(search)) => (directory, search, false),
            (Ok(directory), Err(e)) => {
                tracing::warn!(
                    provider = %ProviderKind::Search,
                    category = %plan.category,
                    error = %e,
                    "search provider failed; returning partner venues only"
                );
                (directory, Vec::new(), true)
            }
            (Err(e), Ok(search)) => {
                tracing::warn!(
                    provider = %ProviderKind::Directory,
                    category = %plan.category,
                    error = %e,
                    "partner directory failed; returning search venues only"
                );
                (Vec::new(), search, true)
            }
            (Err(directory), Err(search)) => {
                return Err(ProviderError::AllProvidersUnavailable {
                    directory: Box::new(directory),
                    search: Box::new(search),
                });
            }
        };

        let directory_count = directory.len();
        let search_count = search.len();
        let venues = merge(plan.origin, plan.radius_meters, directory, search);

        tracing::debug!(
            category = %plan.category,
            radius_meters = plan.radius_meters,
            directory = directory_count,
            search = search_count,
            merged = venues.len(),
            partial,
            "providers merged"
        );

        Ok(Aggregated { venues, partial })
    }
}

async fn bounded<T, F>(provider: ProviderKind, limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            provider,
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Directory venues first, then search venues whose normalised name is not
/// already taken by a partner. Duplicate ids within a source keep the first
/// occurrence. Venues without a location or outside the radius are dropped.
#[must_use]
pub fn merge(
    origin: Coordinate,
    radius_meters: u32,
    directory: Vec<DirectoryRecord>,
    search: Vec<SearchRecord>,
) -> Vec<Venue> {
    let radius_km = f64::from(radius_meters) / 1000.0;
    let mut venues = Vec::with_capacity(directory.len() + search.len());

    let mut directory_ids = HashSet::new();
    let mut partner_names = HashSet::new();
    for record in directory {
        if !directory_ids.insert(record.id.clone()) {
            continue;
        }
        partner_names.insert(normalize_name(&record.name));
        venues.push(from_directory(origin, record));
    }

    let mut search_ids = HashSet::new();
    for record in search {
        if partner_names.contains(&normalize_name(&record.name)) {
            continue;
        }
        if !search_ids.insert(record.id.clone()) {
            continue;
        }
        venues.push(from_search(origin, record));
    }

    venues.retain(|venue| venue.has_distance() && venue.distance_km <= radius_km);
    venues
}

fn distance_from(origin: Coordinate, location: Option<Coordinate>) -> f64 {
    location.map_or(f64::INFINITY, |at| distance_km(origin, at))
}

fn from_directory(origin: Coordinate, record: DirectoryRecord) -> Venue {
    Venue {
        distance_km: distance_from(origin, record.location),
        id: record.id,
        name: record.name,
        location: record.location,
        rating: record.rating,
        address: record.address,
        tier: Tier::from(record.tier),
        source: ProviderKind::Directory,
        open_probability: None,
        phone: record.phone,
        website: record.website,
        types: Vec::new(),
        photos: Vec::new(),
    }
}

fn from_search(origin: Coordinate, record: SearchRecord) -> Venue {
    Venue {
        distance_km: distance_from(origin, record.location),
        id: record.id,
        name: record.name,
        location: record.location,
        rating: record.rating,
        address: record.address,
        tier: Tier::Standard,
        source: ProviderKind::Search,
        open_probability: None,
        phone: None,
        website: None,
        types: record.types,
        photos: record.photos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placefinder_core::PartnerTier;

    fn origin() -> Coordinate {
        Coordinate::new(10.4236, -75.5378).unwrap()
    }

    fn near(offset: f64) -> Option<Coordinate> {
        Some(Coordinate::new(10.4236 + offset, -75.5378).unwrap())
    }

    fn partner(id: &str, name: &str) -> DirectoryRecord {
        DirectoryRecord {
            id: id.to_string(),
            name: name.to_string(),
            location: near(0.001),
            rating: Some(4.5),
            address: String::new(),
            tier: PartnerTier::Premium,
            phone: None,
            website: None,
        }
    }

    fn place(id: &str, name: &str, location: Option<Coordinate>) -> SearchRecord {
        SearchRecord {
            id: id.to_string(),
            name: name.to_string(),
            location,
            rating: Some(4.0),
            address: String::new(),
            types: vec!["lodging".to_string()],
            photos: Vec::new(),
        }
    }

    #[test]
    fn search_record_matching_partner_name_is_dropped() {
        let venues = merge(
            origin(),
            3_000,
            vec![partner("p1", "Hotel Caribe")],
            vec![place("g1", "hotel caribe ", near(0.002))],
        );
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].source, ProviderKind::Directory);
        assert_eq!(venues[0].tier, Tier::Premium);
    }

    #[test]
    fn duplicate_ids_within_a_source_keep_the_first() {
        let venues = merge(
            origin(),
            3_000,
            vec![partner("p1", "One"), partner("p1", "One again")],
            vec![
                place("g1", "Alpha", near(0.002)),
                place("g1", "Alpha copy", near(0.003)),
            ],
        );
        let names: Vec<&str> = venues.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Alpha"]);
    }

    #[test]
    fn same_id_across_sources_is_not_a_duplicate() {
        let venues = merge(
            origin(),
            3_000,
            vec![partner("x", "Partner")],
            vec![place("x", "Generic", near(0.002))],
        );
        assert_eq!(venues.len(), 2);
    }

    #[test]
    fn venues_outside_radius_or_without_location_are_excluded() {
        let venues = merge(
            origin(),
            1_000,
            Vec::new(),
            vec![
                place("in", "Inside", near(0.005)),
                place("out", "Outside", near(0.05)),
                place("none", "Nowhere", None),
            ],
        );
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].id, "in");
        assert!(venues[0].distance_km <= 1.0);
    }

    #[test]
    fn search_venues_are_standard_tier() {
        let venues = merge(origin(), 3_000, Vec::new(), vec![place("g", "G", near(0.0))]);
        assert_eq!(venues[0].tier, Tier::Standard);
        assert_eq!(venues[0].source, ProviderKind::Search);
        assert!(venues[0].distance_km.abs() < f64::EPSILON);
    }
}
