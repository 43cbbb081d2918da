use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "locfinder-cli")]
#[command(about = "Inspect location finder content and behaviour")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List venues after applying filters
    Locations {
        /// Country tab index
        #[arg(long)]
        country: Option<usize>,
        /// City name (case-insensitive)
        #[arg(long)]
        city: Option<String>,
        /// Category filter id; repeat to intersect
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// List category filter groups
    Filters,
    /// Geocode a query and resolve the nearest venue
    Search {
        query: String,
        /// Suggestion to pick (0-based); defaults to the top result
        #[arg(long)]
        pick: Option<usize>,
    },
    /// List the typed content blocks of a CMS page
    Page { slug: String },
    /// Drive the finder headlessly and report markers and popups
    Preview {
        #[arg(long)]
        city: Option<String>,
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Card to click after loading (0-based)
        #[arg(long)]
        card: Option<usize>,
        /// Search text; the first suggestion is picked
        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = locfinder_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Locations {
            country,
            city,
            filters,
        } => commands::run_locations(&config, country, city.as_deref(), &filters).await,
        Commands::Filters => commands::run_filters(&config).await,
        Commands::Search { query, pick } => commands::run_search(&config, &query, pick).await,
        Commands::Page { slug } => commands::run_page(&config, &slug).await,
        Commands::Preview {
            city,
            filters,
            card,
            query,
        } => {
            commands::run_preview(&config, city.as_deref(), &filters, card, query.as_deref()).await
        }
    }
}
