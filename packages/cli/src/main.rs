#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for airwatch.
//!
//! ```text
//! airwatch lookup --lat 34.0522 --lon -118.2437
//! airwatch serve [--bind 0.0.0.0] [--port 8080]
//! ```
//!
//! `lookup` runs a single resolution and prints the same JSON the API
//! returns. `serve` starts the HTTP server. Both read `OPENAQ_API_KEY`
//! from the environment.

use std::time::Duration;

use airwatch_monitoring_models::Coordinate;
use airwatch_openaq::OpenAqConfig;
use airwatch_server::config::ServerConfig;
use airwatch_server_models::{ApiAirQuality, ApiEmptyResult};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airwatch", about = "Nearest-station air quality lookups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the air quality at a coordinate and print it as JSON
    Lookup {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Give up after this many seconds
        #[arg(long, default_value = "20")]
        timeout_secs: u64,
    },
    /// Start the API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to bind (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup {
            lat,
            lon,
            timeout_secs,
        } => {
            let origin = Coordinate::new(lat, lon)?;
            let resolver = airwatch_server::build_resolver(OpenAqConfig::from_env())?;
            let resolved = airwatch_server::resolve_with_timeout(
                &resolver,
                origin,
                Duration::from_secs(timeout_secs),
            )
            .await?;

            let json = match resolved {
                Some(resolved) => serde_json::to_string_pretty(&ApiAirQuality::from(resolved))?,
                None => serde_json::to_string_pretty(&ApiEmptyResult::default())?,
            };
            println!("{json}");
        }
        Commands::Serve { bind, port } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            log::debug!("Server config: {config:?}");
            airwatch_server::run_server(config).await?;
        }
    }

    Ok(())
}
