//! CLI interface for smp-air

use clap::{Parser, Subcommand};
use smp_air::{format_flight_results, FlightSearchService, SearchParams, SmpConfig};
use std::fs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smp-air")]
#[command(about = "Search SMP Air itineraries from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flights
    Search {
        /// Departure airport code (e.g. LAX)
        #[arg(short, long)]
        departure: String,
        /// Arrival airport code (e.g. JFK)
        #[arg(short, long)]
        arrival: String,
        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Return date for round trips (YYYY-MM-DD)
        #[arg(short, long)]
        return_date: Option<String>,
        /// Number of adult passengers
        #[arg(short, long, default_value = "1")]
        passengers: i64,
        /// Cabin class (economy, economyPremium, business, businessPremium, first, firstPremium)
        #[arg(long, default_value = "economy")]
        cabin_class: String,
        /// Maximum number of results
        #[arg(long, default_value = "10")]
        max_results: i64,
        /// Print the raw JSON response instead of the summary
        #[arg(long)]
        json: bool,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SmpConfig::load()?;
    let service = FlightSearchService::new(Arc::new(config))?;

    match cli.command {
        Commands::Search {
            departure,
            arrival,
            date,
            return_date,
            passengers,
            cabin_class,
            max_results,
            json,
            output,
        } => {
            let params = SearchParams {
                departure: departure.to_uppercase(),
                arrival: arrival.to_uppercase(),
                departure_date: date,
                return_date,
                passengers: Some(passengers),
                cabin_class: Some(cabin_class),
                max_results: Some(max_results),
            };

            eprintln!("Searching for flights...");
            let response = service.search_params(&params).await;
            let rendered = serde_json::to_string_pretty(&response)?;

            if let Some(output_file) = output {
                fs::write(&output_file, &rendered)?;
                eprintln!("Results saved to {}", output_file);
            }

            if json {
                println!("{}", rendered);
            } else {
                println!("{}", format_flight_results(&response));
            }

            if response.has_errors() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
