use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "bondwatch")]
#[command(version, about = "Ukrainian bond price sampler with a browser chart")]
#[command(
    long_about = "Periodically scrapes bond prices for a watch-list of ISINs from a broker listing page, stores every observation in SQLite, and serves a chart of the collected history."
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides config file and BONDWATCH_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scrape scheduler and the chart web server
    Serve {
        /// Port to listen on (default from config, 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve the chart only, without scheduled scraping
        #[arg(long)]
        no_schedule: bool,
    },

    /// Run a single scrape cycle now
    Scrape {
        /// Ingest saved listing markup instead of fetching the page
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },

    /// Show the per-ISIN series built from the stored history
    Report {
        /// Print the chart payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored price samples
    Samples {
        /// Only show samples for this ISIN
        #[arg(long)]
        isin: Option<String>,
    },
}
