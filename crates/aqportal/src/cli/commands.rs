//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Seed command arguments.
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Overwrite existing collections with the sample dataset
    #[arg(short, long)]
    pub force: bool,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON or CSV file of air quality records
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Report commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Regions ranked by mean AQI, highest first
    Top {
        /// Number of regions to show (defaults to reports.top_regions)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Monthly mean AQI for one region
    Trend {
        /// Region name (case-insensitive)
        region: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Every alert with active and withdrawn counts
    Alerts {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
