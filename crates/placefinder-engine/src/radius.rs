//! Search radius policy and the per-request search plan.

use placefinder_core::CategoryTag;

use crate::gazetteer::CityAnchor;
use crate::types::{Intent, SearchRequest, SortMode};

pub const MIN_RADIUS_METERS: u32 = 500;
pub const MAX_RADIUS_METERS: u32 = 15_000;

/// Real-time ("near me, now") searches use a fixed window.
pub const REAL_TIME_RADIUS_METERS: u32 = 5_000;
pub const REAL_TIME_RESULT_LIMIT: usize = 15;

#[must_use]
pub fn base_radius_meters(category: CategoryTag) -> f64 {
    match category {
        CategoryTag::Lodging | CategoryTag::Park => 3_000.0,
        CategoryTag::Restaurant => 2_000.0,
        CategoryTag::Bar | CategoryTag::Nightclub => 1_500.0,
        CategoryTag::Museum | CategoryTag::Attraction => 5_000.0,
        CategoryTag::Beach => 10_000.0,
        CategoryTag::Cafe | CategoryTag::Shopping | CategoryTag::Other => 2_500.0,
    }
}

#[must_use]
pub fn intent_factor(intent: Intent) -> f64 {
    match intent {
        Intent::Proximity => 0.6,
        Intent::General => 1.0,
    }
}

/// Base radius scaled by city density and intent, clamped to
/// `[MIN_RADIUS_METERS, MAX_RADIUS_METERS]`.
#[must_use]
pub fn compute_radius(category: CategoryTag, city: Option<&CityAnchor>, intent: Intent) -> u32 {
    let density = city.map_or(1.0, |c| c.density_factor);
    clamp_radius(base_radius_meters(category) * density * intent_factor(intent))
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_radius(meters: f64) -> u32 {
    if meters.is_nan() {
        return MIN_RADIUS_METERS;
    }
    let clamped = meters
        .round()
        .clamp(f64::from(MIN_RADIUS_METERS), f64::from(MAX_RADIUS_METERS));
    clamped as u32
}

/// Everything the engine derives from a request before touching providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPlan {
    pub radius_meters: u32,
    pub result_limit: usize,
    pub sort: SortMode,
    /// Re-order by open-now probability after distance sorting.
    pub blend_open_now: bool,
}

impl SearchPlan {
    #[must_use]
    pub fn for_request(request: &SearchRequest, city: Option<&CityAnchor>) -> Self {
        let sort = SortMode::for_intent(request.intent);

        if request.is_real_time() {
            return Self {
                radius_meters: REAL_TIME_RADIUS_METERS,
                result_limit: REAL_TIME_RESULT_LIMIT,
                sort,
                blend_open_now: true,
            };
        }

        let radius_meters = match request.radius_override_meters {
            Some(meters) => clamp_radius(f64::from(meters)),
            None => compute_radius(request.category, city, request.intent),
        };

        Self {
            radius_meters,
            result_limit: request.result_limit,
            sort,
            blend_open_now: false,
        }
    }
}
