#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the fuel map.
//!
//! ```text
//! fuel_map serve
//! fuel_map map [--zoom 3] [--search S] [--available] [--queue LONG]
//! fuel_map dashboard
//! fuel_map analyze
//! ```
//!
//! Running `fuel_map` with no subcommand enters interactive mode, which
//! lets users pick a tool from a menu.

mod render;

use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use fuel_map_ai::{TrendReport, analyze_fuel_trends, providers::create_provider_from_env};
use fuel_map_spatial::{BAMAKO_BBOX, ThresholdPolicy, ZoomLevel};
use fuel_map_station_models::QueueLength;
use fuel_map_store::{DEFAULT_ADMIN_PASSWORD, DashboardSummary, FuelState, MapView, seed};

#[derive(Parser)]
#[command(name = "fuel_map", about = "Fuel availability map for Bamako")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Print the map pins for a zoom level and filters
    Map {
        /// Zoom level, 1 (far) to 5 (close)
        #[arg(long, default_value_t = 3)]
        zoom: u8,
        /// Name or address search
        #[arg(long)]
        search: Option<String>,
        /// Only stations currently selling fuel
        #[arg(long)]
        available: bool,
        /// Only stations with this queue length (NONE, SHORT, MEDIUM, LONG)
        #[arg(long, value_parser = parse_queue)]
        queue: Option<QueueLength>,
        /// Clustering radius policy (continuous, lookup)
        #[arg(long, value_parser = parse_policy, default_value_t = ThresholdPolicy::default())]
        policy: ThresholdPolicy,
    },
    /// Print global and per-commune availability
    Dashboard,
    /// Ask the configured AI provider for a trend report
    Analyze,
}

/// Top-level tool selection for interactive mode.
enum Tool {
    Server,
    Map,
    Dashboard,
    Analyze,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Map, Self::Dashboard, Self::Analyze];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Map => "Preview map pins",
            Self::Dashboard => "Show availability dashboard",
            Self::Analyze => "Run AI trend analysis",
        }
    }
}

fn parse_queue(raw: &str) -> Result<QueueLength, String> {
    raw.parse()
        .map_err(|_| format!("unknown queue length '{raw}'"))
}

fn parse_policy(raw: &str) -> Result<ThresholdPolicy, String> {
    raw.parse()
        .map_err(|_| format!("unknown clustering policy '{raw}'"))
}

fn load_state() -> Result<FuelState, seed::SeedError> {
    let seed = seed::load_from_env(Utc::now())?;
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    Ok(FuelState::from_seed(seed, admin_password))
}

fn print_map(view: &MapView, policy: ThresholdPolicy) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;
    let markers = view.markers(state.verified_stations(), policy, &BAMAKO_BBOX);

    println!(
        "Zoom {} ({policy}, radius {:.2})",
        view.zoom.get(),
        policy.threshold(view.zoom)
    );
    println!();
    println!("{}", render::markers(&markers, &BAMAKO_BBOX));
    Ok(())
}

fn print_dashboard() -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;
    let summary = DashboardSummary::compute(
        state.verified_stations(),
        state.communes(),
        state.incidents(),
        Utc::now(),
    );
    println!("{}", render::dashboard(&summary));
    Ok(())
}

async fn analyze() -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;
    let provider = create_provider_from_env()
        .inspect_err(|e| log::error!("No AI provider configured: {e}"))?;

    println!("Analyse en cours avec {}...", provider.name());
    let text = analyze_fuel_trends(&*provider, state.verified_stations()).await;
    println!();
    println!("{}", render::report(&TrendReport::parse(&text)));
    Ok(())
}

/// Runs the server on actix's own runtime.
async fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                fuel_map_server::interactive::run().await
            } else {
                fuel_map_server::run_server().await
            }
        })
    })
    .await??;
    Ok(())
}

fn prompt_map_view() -> Result<(MapView, ThresholdPolicy), Box<dyn std::error::Error>> {
    let zoom: u8 = Input::new()
        .with_prompt("Zoom level (1-5)")
        .default(ZoomLevel::INITIAL.get())
        .interact_text()?;

    let search: String = Input::new()
        .with_prompt("Search (empty for all)")
        .allow_empty(true)
        .interact_text()?;

    let available_only = Confirm::new()
        .with_prompt("Only stations with fuel?")
        .default(false)
        .interact()?;

    let policies = [ThresholdPolicy::ContinuousDecay, ThresholdPolicy::LegacyLookup];
    let labels: Vec<String> = policies.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Clustering policy")
        .items(&labels)
        .default(0)
        .interact()?;

    let view = MapView {
        zoom: ZoomLevel::new(zoom),
        search,
        available_only,
        ..MapView::default()
    };
    Ok((view, policies[idx]))
}

async fn interactive() -> Result<(), Box<dyn std::error::Error>> {
    println!("Fuel Map");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => serve(true).await?,
        Tool::Map => {
            let (view, policy) = prompt_map_view()?;
            print_map(&view, policy)?;
        }
        Tool::Dashboard => print_dashboard()?,
        Tool::Analyze => analyze().await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive().await;
    };

    match command {
        Commands::Serve => serve(false).await?,
        Commands::Map {
            zoom,
            search,
            available,
            queue,
            policy,
        } => {
            let view = MapView {
                zoom: ZoomLevel::new(zoom),
                search: search.unwrap_or_default(),
                available_only: available,
                queue,
                selected: None,
            };
            print_map(&view, policy)?;
        }
        Commands::Dashboard => print_dashboard()?,
        Commands::Analyze => analyze().await?,
    }

    Ok(())
}
