//! Tiered ordering of merged venues.
//!
//! Venues are partitioned by [`Tier`] and sorted inside each partition; the
//! partitions are then concatenated in tier order, so a partner venue is
//! never placed after a generic one regardless of rating or distance.

use std::sync::Arc;

use placefinder_core::CategoryTag;

use crate::open_now::{HourlyHeuristic, OpenNowEstimator};
use crate::types::{SortMode, Tier, Venue};

/// Minimum open-probability lead a venue needs to jump the one before it.
pub const OPEN_NOW_SIGNIFICANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenNowContext {
    pub category: CategoryTag,
    pub local_hour: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    pub sort: SortMode,
    pub result_limit: usize,
    /// When set, each tier is re-ordered by open-now probability after the
    /// primary sort.
    pub open_now: Option<OpenNowContext>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub venues: Vec<Venue>,
    pub truncated: bool,
}

pub struct Ranker {
    estimator: Arc<dyn OpenNowEstimator>,
    significance: f64,
}

impl Ranker {
    #[must_use]
    pub fn new(estimator: Arc<dyn OpenNowEstimator>) -> Self {
        Self {
            estimator,
            significance: OPEN_NOW_SIGNIFICANCE,
        }
    }

    #[must_use]
    pub fn rank(&self, venues: Vec<Venue>, options: &RankOptions) -> Ranked {
        let total = venues.len();
        let mut tiers: [Vec<Venue>; 3] = Default::default();
        for venue in venues {
            tiers[tier_slot(venue.tier)].push(venue);
        }

        let mut ordered = Vec::with_capacity(total);
        for mut tier in tiers {
            sort_within_tier(&mut tier, options.sort);
            if let Some(context) = options.open_now {
                tier = self.blend_open_now(tier, context);
            }
            ordered.extend(tier);
        }

        let truncated = ordered.len() > options.result_limit;
        ordered.truncate(options.result_limit);

        Ranked {
            venues: ordered,
            truncated,
        }
    }

    /// Scores every venue, then bubbles a venue ahead of its predecessor
    /// only while it leads by more than the significance margin. Each swap
    /// removes one such inversion and creates none, so the loop ends.
    fn blend_open_now(&self, venues: Vec<Venue>, context: OpenNowContext) -> Vec<Venue> {
        let mut venues: Vec<Venue> = venues
            .into_iter()
            .map(|venue| {
                let probability = self.estimator.open_probability(
                    &venue,
                    context.category,
                    context.local_hour,
                );
                venue.with_open_probability(probability)
            })
            .collect();

        let mut swapped = true;
        while swapped {
            swapped = false;
            for i in 1..venues.len() {
                let earlier = venues[i - 1].open_probability.unwrap_or(0.0);
                let later = venues[i].open_probability.unwrap_or(0.0);
                if later - earlier > self.significance {
                    venues.swap(i - 1, i);
                    swapped = true;
                }
            }
        }

        venues
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(Arc::new(HourlyHeuristic))
    }
}

fn tier_slot(tier: Tier) -> usize {
    match tier {
        Tier::Premium => 0,
        Tier::Allied => 1,
        Tier::Standard => 2,
    }
}

fn sort_within_tier(venues: &mut [Venue], sort: SortMode) {
    match sort {
        SortMode::Rating => {
            venues.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));
        }
        SortMode::Proximity => {
            venues.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        }
    }
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;
