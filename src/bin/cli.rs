//! Catalog CLI
//!
//! Browse, inspect and query catalog listings from the terminal.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use catalog::{
    error::Result,
    models::{Config, Listing},
    pipeline::{self, BrowseOptions, OutputFormat},
};

/// catalog - Exam-prep Catalog Browser
#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    version,
    about = "Paged, filterable exam-prep catalog listings"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "catalog.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page through a listing
    Browse {
        #[arg(short, long, value_enum)]
        listing: Listing,

        /// Facet filter as key=value (repeatable; ranges use key_min/key_max)
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Items per page (default: [session].page_size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Stop after this many items (default: [session].cap)
        #[arg(long)]
        cap: Option<usize>,

        /// Fetch from [source].base_url instead of synthetic data
        #[arg(long)]
        remote: bool,

        /// Print entries as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show the facets a listing can be filtered by
    Facets {
        #[arg(short, long, value_enum)]
        listing: Listing,
    },

    /// Print the query string a filter is sent as
    Query {
        #[arg(short, long, value_enum)]
        listing: Listing,

        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map_or("info", |config| config.logging.level.as_str())
        .to_string();
    init_logging(cli.verbose, &level);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
        Config::default()
    });

    match cli.command {
        Command::Browse {
            listing,
            filters,
            pages,
            page_size,
            cap,
            remote,
            json,
        } => {
            config.validate()?;
            let options = BrowseOptions {
                filter: pipeline::parse_filters(listing, &filters)?,
                pages,
                page_size,
                cap,
                remote,
                format: if json {
                    OutputFormat::Json
                } else {
                    OutputFormat::Template
                },
                ..BrowseOptions::new(listing)
            };

            let stats = pipeline::run_browse(&config, &options, &mut io::stdout().lock()).await?;
            log::info!(
                "Browse finished in {} ms ({} retries)",
                stats.duration().num_milliseconds(),
                stats.retries
            );
        }

        Command::Facets { listing } => {
            println!("{}", listing.display_name());
            for line in pipeline::describe_facets(listing) {
                println!("  {line}");
            }
        }

        Command::Query { listing, filters } => {
            let filter = pipeline::parse_filters(listing, &filters)?;
            println!("{}", filter.to_query_string());
        }

        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
