use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Waypoint CLI - inspect and check trips of the travel marketplace", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use instead of ~/.config/waypoint/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the day-by-day itinerary of a trip document
    Itinerary {
        /// Trip JSON as returned by the backend
        trip: PathBuf,
        /// Override the trip start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Override the number of guests
        #[arg(long)]
        guests: Option<u32>,
        /// Check every line item against the backend
        #[arg(long)]
        check: bool,
    },
    /// Show the ether balance of a wallet address
    Balance {
        address: String,
    },
    /// Validate a service listing draft
    ValidateService {
        /// Draft JSON with the listing form fields
        draft: PathBuf,
    },
    /// Show or initialize the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    waypoint_infrastructure::logging::init_tracing(cli.verbose);

    let config = commands::utils::config_service(cli.config)?;

    match cli.command {
        Commands::Itinerary {
            trip,
            start_date,
            guests,
            check,
        } => commands::itinerary::show(&config, &trip, start_date, guests, check).await?,
        Commands::Balance { address } => commands::balance::show(&config, &address).await?,
        Commands::ValidateService { draft } => commands::service::validate(&draft)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config)?,
            ConfigAction::Init => commands::config::init(&config)?,
        },
    }

    Ok(())
}
