//! Offline lookups that need neither providers nor an API key.

use placefinder_core::{CategoryTag, Language};
use placefinder_engine::{compute_radius, distance_km, format_distance, Coordinate, Gazetteer, Intent};

pub(crate) fn run_city(lat: f64, lng: f64) -> anyhow::Result<()> {
    let origin = Coordinate::new(lat, lng)?;
    println!("{}", describe_city(&Gazetteer::colombia(), origin));
    Ok(())
}

pub(crate) fn run_radius(
    lat: f64,
    lng: f64,
    category: CategoryTag,
    intent: Intent,
) -> anyhow::Result<()> {
    let origin = Coordinate::new(lat, lng)?;
    let gazetteer = Gazetteer::colombia();
    let city = gazetteer.nearest_city(origin);
    let radius = compute_radius(category, city, intent);
    let place = city.map_or("outside service area", |c| c.name);
    println!("{radius} m ({category}, {intent:?}, {place})");
    Ok(())
}

pub(crate) fn describe_city(gazetteer: &Gazetteer, origin: Coordinate) -> String {
    match gazetteer.nearest_city(origin) {
        Some(city) => {
            let anchor = Coordinate::new(city.lat, city.lng).ok();
            let distance = anchor.map_or(f64::INFINITY, |at| distance_km(origin, at));
            format!(
                "{}, {} ({} from centre)",
                city.name,
                city.region,
                format_distance(distance, Language::En)
            )
        }
        None => "outside service area".to_string(),
    }
}
