//! `nearby`: the full search against the partner directory and the place API.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use placefinder_core::{AppConfig, CategoryTag, Language};
use placefinder_engine::{
    format_distance, Coordinate, PlaceFinder, PlacesApiClient, RankedResult, SearchOptions,
    StaticDirectory, Venue,
};

use crate::IntentArg;

#[derive(Debug, Args)]
pub(crate) struct NearbyArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
    /// Venue category, English or Spanish (e.g. `hotel`, `restaurante`)
    #[arg(long)]
    pub category: CategoryTag,
    #[arg(long, value_enum, default_value_t = IntentArg::General)]
    pub intent: IntentArg,
    /// Only places usable right now
    #[arg(long)]
    pub now: bool,
    #[arg(long, default_value = "es")]
    pub lang: Language,
    /// Maximum number of venues
    #[arg(long)]
    pub limit: Option<usize>,
    /// Search radius in metres, overriding the computed one
    #[arg(long)]
    pub radius: Option<u32>,
    /// Print the ranked result as JSON
    #[arg(long)]
    pub json: bool,
}

impl NearbyArgs {
    pub(crate) fn search_options(&self) -> SearchOptions {
        SearchOptions {
            intent: self.intent.into(),
            time_sensitive: self.now,
            language: self.lang,
            result_limit: self.limit,
            radius_override_meters: self.radius,
        }
    }
}

pub(crate) async fn run_nearby(config: &AppConfig, args: NearbyArgs) -> anyhow::Result<()> {
    let api_key = config
        .places_api_key
        .as_deref()
        .context("PLACEFINDER_PLACES_API_KEY must be set for nearby searches")?;

    let partners = placefinder_core::load_partners(&config.partners_path)?;
    let directory = StaticDirectory::from_partners(&partners)?;
    tracing::debug!(partners = directory.len(), "partner directory loaded");

    let search =
        PlacesApiClient::with_base_url(api_key, config.search_timeout_ms, &config.places_base_url)?;

    let finder = PlaceFinder::builder(Arc::new(directory), Arc::new(search))
        .configure(config)
        .build();
    let _sweeper = finder.spawn_cache_sweeper();

    let origin = Coordinate::new(args.lat, args.lng)?;
    let result = finder
        .find_nearby_places(origin, args.category, args.search_options())
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.partial {
        eprintln!("warning: one provider did not answer; results may be incomplete");
    }
    for line in render_result(&result, args.category, args.lang) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_result(
    result: &RankedResult,
    category: CategoryTag,
    language: Language,
) -> Vec<String> {
    let place = result.city.as_deref().unwrap_or("outside service area");
    let mut lines = vec![format!(
        "{category} near {place} (radius {} m, by {})",
        result.radius_meters, result.sort
    )];

    if result.venues.is_empty() {
        lines.push("no venues found".to_string());
        return lines;
    }

    lines.extend(
        result
            .venues
            .iter()
            .enumerate()
            .map(|(i, venue)| render_venue(i + 1, venue, language)),
    );

    if result.truncated {
        lines.push(format!("(showing the first {} matches)", result.venues.len()));
    }
    lines
}

fn render_venue(position: usize, venue: &Venue, language: Language) -> String {
    let rating = venue
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let mut line = format!(
        "{position:>2}. [{}] {}  {}  ★ {rating}",
        venue.tier,
        venue.name,
        format_distance(venue.distance_km, language)
    );
    if !venue.address.is_empty() {
        line.push_str("  ");
        line.push_str(&venue.address);
    }
    line
}
