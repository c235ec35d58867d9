use clap::Parser;
use placefinder_core::Language;
use placefinder_engine::{Coordinate, Gazetteer, ProviderKind, RankedResult, SortMode, Tier, Venue};

use super::*;

#[test]
fn parses_nearby_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "placefinder",
        "nearby",
        "--lat",
        "10.4236",
        "--lng",
        "-75.5378",
        "--category",
        "restaurante",
    ])
    .expect("expected valid cli args");

    let Commands::Nearby(args) = cli.command else {
        panic!("expected nearby command");
    };
    assert!((args.lng - -75.5378).abs() < 1e-9);
    assert_eq!(args.category, CategoryTag::Restaurant);
    assert_eq!(args.intent, IntentArg::General);
    assert_eq!(args.lang, Language::Es);
    assert!(!args.now);
    assert!(!args.json);
}

#[test]
fn nearby_flags_map_to_search_options() {
    let cli = Cli::try_parse_from([
        "placefinder",
        "nearby",
        "--lat",
        "6.2442",
        "--lng",
        "-75.5812",
        "--category",
        "bar",
        "--intent",
        "proximity",
        "--now",
        "--lang",
        "en",
        "--limit",
        "5",
        "--radius",
        "900",
    ])
    .expect("expected valid cli args");

    let Commands::Nearby(args) = cli.command else {
        panic!("expected nearby command");
    };
    let options = args.search_options();
    assert_eq!(options.intent, Intent::Proximity);
    assert!(options.time_sensitive);
    assert_eq!(options.language, Language::En);
    assert_eq!(options.result_limit, Some(5));
    assert_eq!(options.radius_override_meters, Some(900));
}

#[test]
fn unknown_category_is_rejected() {
    let result = Cli::try_parse_from([
        "placefinder",
        "nearby",
        "--lat",
        "10.4",
        "--lng",
        "-75.5",
        "--category",
        "spa",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_radius_command() {
    let cli = Cli::try_parse_from([
        "placefinder",
        "radius",
        "--lat",
        "10.4",
        "--lng",
        "-75.5",
        "--category",
        "playa",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Radius {
            category: CategoryTag::Beach,
            intent: IntentArg::General,
            ..
        }
    ));
}

#[test]
fn only_nearby_loads_configuration() {
    let city = Cli::try_parse_from(["placefinder", "city", "--lat", "6.25", "--lng", "-75.56"])
        .expect("expected valid cli args");
    assert!(!city.command.needs_config());

    let radius = Cli::try_parse_from([
        "placefinder",
        "radius",
        "--lat",
        "6.25",
        "--lng",
        "-75.56",
        "--category",
        "museo",
    ])
    .expect("expected valid cli args");
    assert!(!radius.command.needs_config());

    let nearby = Cli::try_parse_from([
        "placefinder",
        "nearby",
        "--lat",
        "6.25",
        "--lng",
        "-75.56",
        "--category",
        "cafe",
    ])
    .expect("expected valid cli args");
    assert!(nearby.command.needs_config());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["placefinder"]).is_err());
}

#[test]
fn describe_city_inside_and_outside_service_area() {
    let gazetteer = Gazetteer::colombia();
    let getsemani = Coordinate::new(10.4211, -75.5450).unwrap();
    let line = lookup::describe_city(&gazetteer, getsemani);
    assert!(line.starts_with("Cartagena, Bolívar"), "{line}");

    let madrid = Coordinate::new(40.4168, -3.7038).unwrap();
    assert_eq!(lookup::describe_city(&gazetteer, madrid), "outside service area");
}

fn venue(name: &str, tier: Tier, rating: Option<f64>, distance_km: f64) -> Venue {
    Venue {
        id: name.to_lowercase(),
        name: name.to_string(),
        location: None,
        rating,
        address: String::new(),
        tier,
        source: ProviderKind::Directory,
        distance_km,
        open_probability: None,
        phone: None,
        website: None,
        types: Vec::new(),
        photos: Vec::new(),
    }
}

#[test]
fn render_result_lists_venues_in_order() {
    let result = RankedResult {
        venues: vec![
            venue("Sofitel", Tier::Premium, Some(4.8), 1.52),
            venue("Kiosko", Tier::Standard, None, 0.05),
        ],
        radius_meters: 2_400,
        truncated: true,
        partial: false,
        sort: SortMode::Rating,
        city: Some("Cartagena".to_string()),
    };

    let lines = nearby::render_result(&result, CategoryTag::Lodging, Language::En);
    assert_eq!(lines[0], "lodging near Cartagena (radius 2400 m, by rating)");
    assert_eq!(lines[1], " 1. [premium] Sofitel  1.5km  ★ 4.8");
    assert_eq!(lines[2], " 2. [standard] Kiosko  very close  ★ -");
    assert_eq!(lines[3], "(showing the first 2 matches)");
}

#[test]
fn render_result_without_venues() {
    let result = RankedResult {
        venues: Vec::new(),
        radius_meters: 2_000,
        truncated: false,
        partial: false,
        sort: SortMode::Proximity,
        city: None,
    };
    let lines = nearby::render_result(&result, CategoryTag::Restaurant, Language::Es);
    assert_eq!(
        lines,
        vec![
            "restaurant near outside service area (radius 2000 m, by proximity)".to_string(),
            "no venues found".to_string(),
        ]
    );
}
