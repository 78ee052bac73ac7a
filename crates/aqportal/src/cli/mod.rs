//! Command-line interface for aqportal.
//!
//! With no subcommand the binary opens the interactive portal. The
//! subcommands cover the same data without prompts.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{ConfigCommand, ImportCommand, ReportCommand, SeedCommand, StatusCommand};

/// aqportal - Air quality and pollution tracking portal
///
/// Keeps air quality readings, pollutants, citizens, alerts and health
/// guidelines in JSON files, with admin and citizen menus on top.
#[derive(Debug, Parser)]
#[command(name = "aqportal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the JSON collections (overrides storage.data_dir)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive admin/citizen menu
    Menu,

    /// Write the sample dataset
    Seed(SeedCommand),

    /// Bulk import air quality records
    Import(ImportCommand),

    /// Print a report
    #[command(subcommand)]
    Report(ReportCommand),

    /// Show the data directory and record counts
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
