//! The `find_nearby_places` entry point.
//!
//! Flow per request: nearest city, search plan, cache lookup, then on a miss
//! one shared fetch per cache key (merge and rank), storing only complete
//! results.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use placefinder_core::{AppConfig, CategoryTag};

use crate::aggregate::{Aggregator, FetchPlan, DEFAULT_DIRECTORY_TIMEOUT, DEFAULT_SEARCH_TIMEOUT};
use crate::cache::{
    spawn_sweeper, CacheKey, CacheStats, CacheTtlPolicy, GeoCache, SweeperHandle,
    DEFAULT_MAX_ENTRIES, DEFAULT_SWEEP_INTERVAL,
};
use crate::clock::{Clock, SystemClock};
use crate::error::{ProviderError, SearchError};
use crate::gazetteer::Gazetteer;
use crate::geo::Coordinate;
use crate::open_now::local_hour;
use crate::provider::{DirectoryProvider, SearchProvider};
use crate::radius::SearchPlan;
use crate::rank::{OpenNowContext, RankOptions, Ranker};
use crate::types::{RankedResult, SearchOptions, SearchRequest, DEFAULT_RESULT_LIMIT};

/// Colombia does not observe daylight saving time.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -5;

type InFlight = Shared<BoxFuture<'static, Result<RankedResult, SearchError>>>;

/// Everything one fetch needs, fixed before the cache lookup.
struct Job {
    key: CacheKey,
    plan: SearchPlan,
    fetch: FetchPlan,
    city: Option<String>,
    open_now: Option<OpenNowContext>,
}

struct Inner {
    gazetteer: Arc<Gazetteer>,
    aggregator: Aggregator,
    ranker: Ranker,
    cache: Arc<GeoCache>,
    ttl: CacheTtlPolicy,
    clock: Arc<dyn Clock>,
    utc_offset_hours: i32,
    default_result_limit: usize,
    sweep_interval: Duration,
    in_flight: Mutex<HashMap<CacheKey, InFlight>>,
}

/// Location-aware venue search over a partner directory and a generic
/// search provider. Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct PlaceFinder {
    inner: Arc<Inner>,
}

impl PlaceFinder {
    #[must_use]
    pub fn builder(
        directory: Arc<dyn DirectoryProvider>,
        search: Arc<dyn SearchProvider>,
    ) -> PlaceFinderBuilder {
        PlaceFinderBuilder::new(directory, search)
    }

    /// Finds venues of `category` around `origin`, partners first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Provider`] when neither provider answered.
    /// A single failing provider yields a `partial` result instead.
    pub async fn find_nearby_places(
        &self,
        origin: Coordinate,
        category: CategoryTag,
        options: SearchOptions,
    ) -> Result<RankedResult, SearchError> {
        let inner = &self.inner;
        let request =
            SearchRequest::from_options(origin, category, options, inner.default_result_limit);

        let city = inner.gazetteer.nearest_city(origin);
        if city.is_none() {
            tracing::debug!(%origin, "origin outside known cities; using unit density");
        }

        let plan = SearchPlan::for_request(&request, city);
        let open_hour = plan
            .blend_open_now
            .then(|| local_hour(inner.clock.now(), inner.utc_offset_hours));

        let key = CacheKey::new(origin, category, plan.radius_meters, plan.sort)
            .with_result_limit(plan.result_limit)
            .with_language(request.language)
            .with_open_hour(open_hour);

        if let Some(hit) = inner.cache.get(&key) {
            tracing::debug!(%key, "cache hit");
            return Ok(hit);
        }
        tracing::debug!(%key, radius_meters = plan.radius_meters, "cache miss");

        let job = Job {
            key,
            plan,
            fetch: FetchPlan {
                origin,
                category,
                radius_meters: plan.radius_meters,
                sort: plan.sort,
                language: request.language,
            },
            city: city.map(|c| c.name.to_string()),
            open_now: open_hour.map(|hour| OpenNowContext {
                category,
                local_hour: hour,
            }),
        };

        Inner::join_or_start(inner, job).await
    }

    /// [`PlaceFinder::find_nearby_places`] for raw degrees.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Location`] for an invalid coordinate, before
    /// any provider is contacted.
    pub async fn find_nearby_places_at(
        &self,
        lat: f64,
        lng: f64,
        category: CategoryTag,
        options: SearchOptions,
    ) -> Result<RankedResult, SearchError> {
        let origin = Coordinate::new(lat, lng)?;
        self.find_nearby_places(origin, category, options).await
    }

    #[must_use]
    pub fn gazetteer(&self) -> &Gazetteer {
        &self.inner.gazetteer
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Starts the periodic expired-entry sweep for this engine's cache at
    /// the configured interval. The sweep stops when the handle is dropped.
    #[must_use]
    pub fn spawn_cache_sweeper(&self) -> SweeperHandle {
        spawn_sweeper(Arc::clone(&self.inner.cache), self.inner.sweep_interval)
    }
}

impl Inner {
    /// Returns the in-flight fetch for `job.key`, starting one if none is
    /// running. The fetch runs as its own task, so it completes, stores, and
    /// leaves the map even when every caller has stopped waiting.
    fn join_or_start(this: &Arc<Self>, job: Job) -> InFlight {
        let mut in_flight = this
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(running) = in_flight.get(&job.key) {
            tracing::debug!(key = %job.key, "joining in-flight fetch");
            return running.clone();
        }

        let key = job.key;
        let owner = Arc::clone(this);
        let task = tokio::spawn(async move {
            let outcome = owner.fetch_rank_store(&job).await;
            owner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&job.key);
            outcome
        });

        let fetch = async move {
            match task.await {
                Ok(outcome) => outcome.map_err(SearchError::from),
                Err(e) => Err(SearchError::FetchAborted {
                    reason: e.to_string(),
                }),
            }
        }
        .boxed()
        .shared();

        in_flight.insert(key, fetch.clone());
        fetch
    }

    async fn fetch_rank_store(&self, job: &Job) -> Result<RankedResult, ProviderError> {
        let aggregated = self
            .aggregator
            .fetch(&job.fetch)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    key = %job.key,
                    category = %job.fetch.category,
                    error = %e,
                    "no provider answered"
                );
            })?;

        let ranked = self.ranker.rank(
            aggregated.venues,
            &RankOptions {
                sort: job.plan.sort,
                result_limit: job.plan.result_limit,
                open_now: job.open_now,
            },
        );

        let result = RankedResult {
            venues: ranked.venues,
            radius_meters: job.plan.radius_meters,
            truncated: ranked.truncated,
            partial: aggregated.partial,
            sort: job.plan.sort,
            city: job.city.clone(),
        };

        if result.partial {
            tracing::debug!(key = %job.key, "partial result not cached");
        } else {
            let ttl = self.ttl.ttl_for(job.fetch.category, job.plan.sort);
            if let Err(e) = self.cache.set(job.key, result.clone(), ttl) {
                tracing::warn!(key = %job.key, error = %e, "cache store failed; serving uncached result");
            }
        }

        Ok(result)
    }
}

/// Assembles a [`PlaceFinder`]. Anything not set falls back to the
/// production defaults.
pub struct PlaceFinderBuilder {
    directory: Arc<dyn DirectoryProvider>,
    search: Arc<dyn SearchProvider>,
    gazetteer: Option<Arc<Gazetteer>>,
    cache: Option<Arc<GeoCache>>,
    clock: Option<Arc<dyn Clock>>,
    ranker: Option<Ranker>,
    ttl: CacheTtlPolicy,
    directory_timeout: Duration,
    search_timeout: Duration,
    utc_offset_hours: i32,
    default_result_limit: usize,
    cache_max_entries: usize,
    sweep_interval: Duration,
}

impl PlaceFinderBuilder {
    fn new(directory: Arc<dyn DirectoryProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            directory,
            search,
            gazetteer: None,
            cache: None,
            clock: None,
            ranker: None,
            ttl: CacheTtlPolicy::default(),
            directory_timeout: DEFAULT_DIRECTORY_TIMEOUT,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            default_result_limit: DEFAULT_RESULT_LIMIT,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Applies timeouts, result limit, UTC offset, and cache settings from
    /// the application config.
    #[must_use]
    pub fn configure(mut self, config: &AppConfig) -> Self {
        self.directory_timeout = Duration::from_millis(config.directory_timeout_ms);
        self.search_timeout = Duration::from_millis(config.search_timeout_ms);
        self.default_result_limit = config.default_result_limit;
        self.utc_offset_hours = config.utc_offset_hours;
        self.cache_max_entries = config.cache_max_entries;
        self.sweep_interval = Duration::from_secs(config.cache_sweep_interval_secs);
        self.ttl = CacheTtlPolicy::from_config(config);
        self
    }

    #[must_use]
    pub fn gazetteer(mut self, gazetteer: Arc<Gazetteer>) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Shares an existing cache. Its own clock and size bound win over the
    /// builder's.
    #[must_use]
    pub fn cache(mut self, cache: Arc<GeoCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = Some(ranker);
        self
    }

    #[must_use]
    pub fn ttl_policy(mut self, ttl: CacheTtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn timeouts(mut self, directory: Duration, search: Duration) -> Self {
        self.directory_timeout = directory;
        self.search_timeout = search;
        self
    }

    #[must_use]
    pub fn utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    #[must_use]
    pub fn default_result_limit(mut self, limit: usize) -> Self {
        self.default_result_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = every.max(Duration::from_millis(1));
        self
    }

    #[must_use]
    pub fn build(self) -> PlaceFinder {
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(GeoCache::new(Arc::clone(&clock), self.cache_max_entries)));

        PlaceFinder {
            inner: Arc::new(Inner {
                gazetteer: self.gazetteer.unwrap_or_default(),
                aggregator: Aggregator::new(self.directory, self.search)
                    .with_timeouts(self.directory_timeout, self.search_timeout),
                ranker: self.ranker.unwrap_or_default(),
                cache,
                ttl: self.ttl,
                clock,
                utc_offset_hours: self.utc_offset_hours,
                default_result_limit: self.default_result_limit,
                sweep_interval: self.sweep_interval,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }
}
