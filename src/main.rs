//! # Hora Clock Application Entry Point
//!
//! This binary crate wires location acquisition, the hora engine and the terminal
//! renderer together. It prints today's day and night planetary hours for the
//! observer's location, marking the hora that is active right now.


use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use hora_clock_lib::config::{Config, DEFAULT_CONFIG_FILE};
use hora_clock_lib::hora::compute_horas;
use hora_clock_lib::location::{self, LocationRequest};
use hora_clock_lib::renderer::{draw_ascii, hora_error_message, location_error_message};
use hora_clock_lib::solar::NoaaSolarCalculator;
use hora_clock_lib::GeoCoordinate;

/// How often `--watch` recomputes the table
const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Planetary hours (horas) for your location, from today's sunrise and sunset
#[derive(Parser, Debug)]
#[command(name = "hora-clock", version, about)]
struct Cli {
    /// Latitude in decimal degrees (north positive)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees (east positive)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Ignore the cached location and acquire a fresh one
    #[arg(long)]
    no_cache: bool,

    /// Print the result as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Keep running and refresh every minute
    #[arg(long)]
    watch: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_from_path(&cli.config);

    let mut request = LocationRequest::from_config(&config.location);
    request.explicit = cli
        .lat
        .zip(cli.lon)
        .map(|(lat, lon)| GeoCoordinate::new(lat, lon));
    request.use_cache = !cli.no_cache;

    // Location sources are async and bounded by a timeout
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(&cli, &config, &request))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli, config: &Config, request: &LocationRequest) -> anyhow::Result<()> {
    if !cli.watch {
        return show(cli, config, request).await;
    }

    // Every tick is a fresh computation, like re-opening the view
    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    loop {
        ticker.tick().await;
        print!("\x1B[2J\x1B[H");
        if let Err(e) = show(cli, config, request).await {
            warn!("refresh failed: {:#}", e);
        }
    }
}

/// Acquire a location, compute the horas for now and print them.
async fn show(cli: &Cli, config: &Config, request: &LocationRequest) -> anyhow::Result<()> {
    let coordinate = match location::acquire(request).await {
        Ok(coordinate) => coordinate,
        Err(error) => {
            eprintln!("{}", location_error_message(&error));
            return Err(error.into());
        }
    };
    debug!(?coordinate, "computing horas");

    let result = match compute_horas(coordinate, None, &NoaaSolarCalculator::default()) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("{}", hora_error_message(&error));
            return Err(error.into());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        draw_ascii(&result, coordinate, &config.display);
    }
    Ok(())
}
