mod lookup;
mod nearby;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use placefinder_core::CategoryTag;
use placefinder_engine::Intent;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "placefinder")]
#[command(about = "Find partner and nearby venues around a coordinate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search venues of a category around a coordinate
    Nearby(nearby::NearbyArgs),
    /// Show the nearest known city for a coordinate
    City {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Show the search radius that would be used for a coordinate and category
    Radius {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Venue category, English or Spanish (e.g. `restaurant`, `playa`)
        #[arg(long)]
        category: CategoryTag,
        #[arg(long, value_enum, default_value_t = IntentArg::General)]
        intent: IntentArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IntentArg {
    /// Tightly local results
    Proximity,
    /// City-wide results
    General,
}

impl From<IntentArg> for Intent {
    fn from(arg: IntentArg) -> Self {
        match arg {
            IntentArg::Proximity => Intent::Proximity,
            IntentArg::General => Intent::General,
        }
    }
}

impl Commands {
    /// Only `nearby` talks to providers. The lookups run without any env
    /// configuration, so a bad variable cannot break them.
    fn needs_config(&self) -> bool {
        matches!(self, Commands::Nearby(_))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = if cli.command.needs_config() {
        Some(placefinder_core::load_app_config()?)
    } else {
        None
    };

    let default_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Nearby(args) => {
            let config = config.context("configuration is required for nearby searches")?;
            nearby::run_nearby(&config, args).await?;
        }
        Commands::City { lat, lng } => lookup::run_city(lat, lng)?,
        Commands::Radius {
            lat,
            lng,
            category,
            intent,
        } => lookup::run_radius(lat, lng, category, intent.into())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
