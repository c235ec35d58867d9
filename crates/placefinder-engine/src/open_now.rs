//! Heuristic "is it open right now" scoring.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use placefinder_core::CategoryTag;

use crate::types::Venue;

/// Estimates how likely a venue is to be operating at a local hour.
pub trait OpenNowEstimator: Send + Sync {
    /// Returns a probability in `[0, 1]`.
    fn open_probability(&self, venue: &Venue, category: CategoryTag, local_hour: u32) -> f64;
}

/// Opening-hour pattern a venue follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HourProfile {
    Meals,
    Nightlife,
    Coffee,
    Daytime,
}

impl HourProfile {
    fn from_place_type(place_type: &str) -> Option<Self> {
        match place_type {
            "restaurant" => Some(Self::Meals),
            "bar" | "night_club" => Some(Self::Nightlife),
            "cafe" => Some(Self::Coffee),
            "museum" | "tourist_attraction" => Some(Self::Daytime),
            _ => None,
        }
    }

    fn from_category(category: CategoryTag) -> Option<Self> {
        match category {
            CategoryTag::Restaurant => Some(Self::Meals),
            CategoryTag::Bar | CategoryTag::Nightclub => Some(Self::Nightlife),
            CategoryTag::Cafe => Some(Self::Coffee),
            CategoryTag::Museum | CategoryTag::Attraction => Some(Self::Daytime),
            CategoryTag::Lodging
            | CategoryTag::Beach
            | CategoryTag::Park
            | CategoryTag::Shopping
            | CategoryTag::Other => None,
        }
    }

    fn adjustment(self, h: u32) -> f64 {
        let mut delta = 0.0;
        match self {
            Self::Meals => {
                if (12..=14).contains(&h) {
                    delta += 0.3;
                }
                if (19..=22).contains(&h) {
                    delta += 0.4;
                }
            }
            Self::Nightlife => {
                // 18:00 through 02:59, across midnight.
                if h >= 18 || h <= 2 {
                    delta += 0.5;
                }
                if (6..=12).contains(&h) {
                    delta -= 0.3;
                }
            }
            Self::Coffee => {
                if (6..=11).contains(&h) {
                    delta += 0.4;
                }
                if (14..=17).contains(&h) {
                    delta += 0.2;
                }
            }
            Self::Daytime => {
                if (9..=17).contains(&h) {
                    delta += 0.3;
                }
                if !(8..=18).contains(&h) {
                    delta -= 0.4;
                }
            }
        }
        delta
    }
}

/// Profiles named by the venue's own place types. Venues without types
/// (partner entries) follow the searched category.
fn hour_profiles(venue: &Venue, category: CategoryTag) -> Vec<HourProfile> {
    if venue.types.is_empty() {
        return HourProfile::from_category(category).into_iter().collect();
    }
    let mut profiles = Vec::new();
    for profile in venue
        .types
        .iter()
        .filter_map(|t| HourProfile::from_place_type(t))
    {
        if !profiles.contains(&profile) {
            profiles.push(profile);
        }
    }
    profiles
}

/// Hour-of-day rules keyed on each venue's place types, nudged up for
/// well-rated venues.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourlyHeuristic;

impl OpenNowEstimator for HourlyHeuristic {
    fn open_probability(&self, venue: &Venue, category: CategoryTag, local_hour: u32) -> f64 {
        let h = local_hour % 24;
        let mut probability: f64 = 0.5;

        for profile in hour_profiles(venue, category) {
            probability += profile.adjustment(h);
        }

        if venue.rating.is_some_and(|r| r >= 4.0) {
            probability += 0.1;
        }

        probability.clamp(0.0, 1.0)
    }
}

/// Hour of day at a fixed UTC offset. Offsets outside chrono's range fall
/// back to UTC.
#[must_use]
pub fn local_hour(now: DateTime<Utc>, utc_offset_hours: i32) -> u32 {
    match FixedOffset::east_opt(utc_offset_hours.saturating_mul(3_600)) {
        Some(offset) => now.with_timezone(&offset).hour(),
        None => now.hour(),
    }
}
