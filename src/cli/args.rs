use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mybike")]
#[command(version)]
#[command(about = "Offline-first bike station list", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Origin server URL (overrides configuration)
    #[arg(short, long, env = "MYBIKE_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default configuration file
    Init,
    /// Load and show stations, nearest first when a position is known (default)
    Stations {
        /// Latitude of the current position
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude of the current position
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Provision the current cache version and drop stale ones
    Install,
    /// Fetch a path through the cache proxy
    Fetch {
        /// Path or URL to request
        path: String,
        /// Print the response body
        #[arg(long)]
        body: bool,
    },
    /// Subscribe to push notifications
    Subscribe,
    /// Show an incoming push message as a notification
    Push {
        /// Message text
        message: String,
        /// Also simulate a click on the notification
        #[arg(long)]
        click: bool,
    },
    /// Show cache and configuration status
    Status,
    /// Show version information
    Version,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Stations {
            lat: None,
            lon: None,
            json: false,
        }
    }
}
