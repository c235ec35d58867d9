use std::collections::HashMap;

use super::*;
use crate::types::ProviderKind;

fn venue(id: &str, tier: Tier, rating: Option<f64>, distance_km: f64) -> Venue {
    Venue {
        id: id.to_string(),
        name: id.to_string(),
        location: None,
        rating,
        address: String::new(),
        tier,
        source: if tier == Tier::Standard {
            ProviderKind::Search
        } else {
            ProviderKind::Directory
        },
        distance_km,
        open_probability: None,
        phone: None,
        website: None,
        types: Vec::new(),
        photos: Vec::new(),
    }
}

fn ids(ranked: &Ranked) -> Vec<&str> {
    ranked.venues.iter().map(|v| v.id.as_str()).collect()
}

fn options(sort: SortMode, result_limit: usize) -> RankOptions {
    RankOptions {
        sort,
        result_limit,
        open_now: None,
    }
}

/// Estimator with a fixed probability per venue id.
struct FixedOdds(HashMap<&'static str, f64>);

impl OpenNowEstimator for FixedOdds {
    fn open_probability(&self, venue: &Venue, _: CategoryTag, _: u32) -> f64 {
        self.0.get(venue.id.as_str()).copied().unwrap_or(0.5)
    }
}

fn blended(odds: &[(&'static str, f64)]) -> (Ranker, RankOptions) {
    let ranker = Ranker::new(Arc::new(FixedOdds(odds.iter().copied().collect())));
    let options = RankOptions {
        sort: SortMode::Proximity,
        result_limit: 15,
        open_now: Some(OpenNowContext {
            category: CategoryTag::Bar,
            local_hour: 22,
        }),
    };
    (ranker, options)
}

#[test]
fn rating_mode_sorts_each_tier_descending() {
    let venues = vec![
        venue("s-low", Tier::Standard, Some(3.1), 0.2),
        venue("p-mid", Tier::Premium, Some(4.2), 2.0),
        venue("s-high", Tier::Standard, Some(4.9), 0.1),
        venue("a-only", Tier::Allied, Some(3.0), 0.5),
        venue("p-top", Tier::Premium, Some(4.8), 3.0),
    ];
    let ranked = Ranker::default().rank(venues, &options(SortMode::Rating, 15));
    assert_eq!(
        ids(&ranked),
        vec!["p-top", "p-mid", "a-only", "s-high", "s-low"]
    );
    assert!(!ranked.truncated);
}

#[test]
fn missing_rating_sorts_as_zero() {
    let venues = vec![
        venue("unrated", Tier::Standard, None, 0.1),
        venue("rated", Tier::Standard, Some(0.5), 0.2),
    ];
    let ranked = Ranker::default().rank(venues, &options(SortMode::Rating, 15));
    assert_eq!(ids(&ranked), vec!["rated", "unrated"]);
}

#[test]
fn proximity_mode_sorts_each_tier_by_distance() {
    let venues = vec![
        venue("s-near", Tier::Standard, Some(5.0), 0.1),
        venue("p-far", Tier::Premium, Some(3.0), 4.0),
        venue("p-near", Tier::Premium, Some(3.0), 1.0),
        venue("s-far", Tier::Standard, Some(5.0), 2.5),
    ];
    let ranked = Ranker::default().rank(venues, &options(SortMode::Proximity, 15));
    assert_eq!(ids(&ranked), vec!["p-near", "p-far", "s-near", "s-far"]);
}

#[test]
fn equal_keys_keep_input_order() {
    let venues = vec![
        venue("first", Tier::Standard, Some(4.0), 1.0),
        venue("second", Tier::Standard, Some(4.0), 1.0),
        venue("third", Tier::Standard, Some(4.0), 1.0),
    ];
    let by_rating = Ranker::default().rank(venues.clone(), &options(SortMode::Rating, 15));
    assert_eq!(ids(&by_rating), vec!["first", "second", "third"]);
    let by_distance = Ranker::default().rank(venues, &options(SortMode::Proximity, 15));
    assert_eq!(ids(&by_distance), vec!["first", "second", "third"]);
}

#[test]
fn truncates_after_ordering_and_flags_it() {
    let venues: Vec<Venue> = (0..20)
        .map(|i| venue(&format!("s{i:02}"), Tier::Standard, None, f64::from(i) / 10.0))
        .chain(std::iter::once(venue("partner", Tier::Premium, None, 9.0)))
        .collect();
    let ranked = Ranker::default().rank(venues, &options(SortMode::Proximity, 15));
    assert_eq!(ranked.venues.len(), 15);
    assert!(ranked.truncated);
    assert_eq!(ranked.venues[0].id, "partner");
    assert_eq!(ranked.venues[1].id, "s00");
}

#[test]
fn exactly_limit_is_not_truncated() {
    let venues: Vec<Venue> = (0..3)
        .map(|i| venue(&format!("v{i}"), Tier::Standard, None, 1.0))
        .collect();
    let ranked = Ranker::default().rank(venues, &options(SortMode::Rating, 3));
    assert_eq!(ranked.venues.len(), 3);
    assert!(!ranked.truncated);
}

#[test]
fn open_now_promotes_a_clearly_more_open_venue() {
    let (ranker, opts) = blended(&[("near-closed", 0.2), ("far-open", 0.9)]);
    let venues = vec![
        venue("near-closed", Tier::Standard, None, 0.3),
        venue("far-open", Tier::Standard, None, 1.2),
    ];
    let ranked = ranker.rank(venues, &opts);
    assert_eq!(ids(&ranked), vec!["far-open", "near-closed"]);
    assert_eq!(ranked.venues[0].open_probability, Some(0.9));
}

#[test]
fn open_now_ignores_small_differences() {
    let (ranker, opts) = blended(&[("near", 0.5), ("far", 0.75)]);
    let venues = vec![
        venue("near", Tier::Standard, None, 0.3),
        venue("far", Tier::Standard, None, 1.2),
    ];
    let ranked = ranker.rank(venues, &opts);
    assert_eq!(ids(&ranked), vec!["near", "far"]);
    assert!(ranked.venues.iter().all(|v| v.open_probability.is_some()));
}

#[test]
fn open_now_never_crosses_tiers() {
    let (ranker, opts) = blended(&[("partner", 0.0), ("generic", 1.0)]);
    let venues = vec![
        venue("generic", Tier::Standard, None, 0.1),
        venue("partner", Tier::Premium, None, 4.0),
    ];
    let ranked = ranker.rank(venues, &opts);
    assert_eq!(ids(&ranked), vec!["partner", "generic"]);
}

#[test]
fn open_now_bubbles_across_several_positions() {
    let (ranker, opts) = blended(&[("a", 0.1), ("b", 0.1), ("c", 0.95)]);
    let venues = vec![
        venue("a", Tier::Standard, None, 0.1),
        venue("b", Tier::Standard, None, 0.2),
        venue("c", Tier::Standard, None, 0.3),
    ];
    let ranked = ranker.rank(venues, &opts);
    assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
}

#[test]
fn premium_never_follows_standard() {
    let venues = vec![
        venue("s1", Tier::Standard, Some(5.0), 0.01),
        venue("a1", Tier::Allied, Some(1.0), 9.0),
        venue("p1", Tier::Premium, None, 14.0),
        venue("s2", Tier::Standard, Some(4.0), 0.02),
    ];
    for sort in [SortMode::Rating, SortMode::Proximity] {
        let ranked = Ranker::default().rank(venues.clone(), &options(sort, 15));
        let tiers: Vec<Tier> = ranked.venues.iter().map(|v| v.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted, "{sort}");
    }
}

#[test]
fn default_heuristic_promotes_a_venue_open_at_this_hour() {
    let mut club = venue("club", Tier::Standard, None, 0.2);
    club.types = vec!["night_club".to_string(), "bar".to_string()];
    let mut museum = venue("museum", Tier::Standard, Some(4.6), 1.5);
    museum.types = vec!["museum".to_string(), "tourist_attraction".to_string()];

    let options = RankOptions {
        sort: SortMode::Proximity,
        result_limit: 15,
        open_now: Some(OpenNowContext {
            category: CategoryTag::Attraction,
            local_hour: 10,
        }),
    };
    let ranked = Ranker::default().rank(vec![club, museum], &options);
    assert_eq!(ids(&ranked), vec!["museum", "club"]);
    assert_eq!(ranked.venues[1].open_probability, Some(0.2));
}
