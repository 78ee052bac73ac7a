//! `aqportal` - CLI for the air quality portal
//!
//! Without a subcommand this opens the interactive admin/citizen menu.
//! The subcommands seed, import, report on and inspect the same data.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};

use aqportal::cli::{Cli, Command, ConfigCommand, ReportCommand};
use aqportal::model::{AirQualityRecord, Alert};
use aqportal::report::{
    alert_summary, alert_table, monthly_trend, region_table, top_polluted_regions, trend_table,
};
use aqportal::{import, init_logging, menu, seed, Config, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration, letting --data-dir win over the file
    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }
    debug!("Using data directory {}", config.data_dir().display());

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => run_menu(config).await,
        Command::Seed(cmd) => handle_seed(&config, cmd.force),
        Command::Import(cmd) => handle_import(&config, &cmd.file),
        Command::Report(cmd) => handle_report(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cli.config.as_deref(), cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let dir = config.data_dir();
    Store::open(&dir).with_context(|| format!("cannot open data directory {}", dir.display()))
}

async fn run_menu(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config)?;
    if config.seed.sample_data {
        seed::ensure_sample_data(&store, config.seed.rng_seed)?;
    }

    // stdin reads block, so the menu gets its own thread while this task
    // waits for Ctrl-C
    let mut session = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        menu::run(&store, &config, stdin.lock(), std::io::stdout())
    });

    tokio::select! {
        result = &mut session => result??,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                println!();
                println!("Exiting...");
                std::process::exit(0);
            }
            Err(err) => {
                warn!("Cannot listen for Ctrl-C: {}", err);
                session.await??;
            }
        },
    }
    Ok(())
}

fn handle_seed(config: &Config, force: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let dir = store.data_dir().display();

    if force {
        let data = seed::create_sample_data(&store, config.seed.rng_seed)?;
        println!(
            "Sample data created in {dir} ({} readings)",
            data.air_quality.len()
        );
    } else if seed::ensure_sample_data(&store, config.seed.rng_seed)? {
        println!("Sample data created in {dir}");
    } else {
        println!("Data already present in {dir}. Use --force to overwrite.");
    }
    Ok(())
}

fn handle_import(config: &Config, file: &Path) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let added = import::import_into(&store, file)?;
    println!("Imported {added} records.");
    Ok(())
}

fn handle_report(config: &Config, cmd: ReportCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let records = store.load::<AirQualityRecord>();

    match cmd {
        ReportCommand::Top { limit, json } => {
            let limit = match limit {
                Some(0) => None,
                Some(n) => Some(n),
                None => config.top_regions_limit(),
            };
            let ranked = top_polluted_regions(&records, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if ranked.is_empty() {
                println!("No data available.");
            } else {
                print!("{}", region_table(&ranked));
            }
        }
        ReportCommand::Trend { region, json } => {
            let trend = monthly_trend(&records, &region);
            if json {
                println!("{}", serde_json::to_string_pretty(&trend)?);
            } else if trend.is_empty() {
                println!("No data for that region.");
            } else {
                print!("{}", trend_table(&trend));
            }
        }
        ReportCommand::Alerts { json } => {
            let alerts = store.load::<Alert>();
            let summary = alert_summary(&alerts);
            if json {
                let report = serde_json::json!({
                    "active": summary.active,
                    "withdrawn": summary.withdrawn,
                    "alerts": summary.alerts,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if alerts.is_empty() {
                println!("No alerts.");
            } else {
                print!("{}", alert_table(summary.alerts));
                println!(
                    "Active: {}, Withdrawn: {}",
                    summary.active, summary.withdrawn
                );
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let stats = open_store(config)?.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("aqportal status");
        println!("---------------");
        println!("Data directory: {}", stats.data_dir.display());
        println!("Air quality:    {}", stats.air_quality);
        println!("Pollutants:     {}", stats.pollutants);
        println!("Citizens:       {}", stats.citizens);
        println!("Alerts:         {}", stats.alerts);
        println!("Guidelines:     {}", stats.guidelines);
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    config_path: Option<&Path>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!();
                println!("[Admin]");
                println!("  Username:           {}", config.admin.username);
                println!("  Password digest:    {}", config.admin.password_blake3);
                println!();
                println!("[Reports]");
                match config.top_regions_limit() {
                    Some(n) => println!("  Top regions:        {n}"),
                    None => println!("  Top regions:        all"),
                }
                println!();
                println!("[Seed]");
                println!("  Sample data:        {}", config.seed.sample_data);
                println!("  RNG seed:           {}", config.seed.rng_seed);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path: PathBuf = file
                .or_else(|| config_path.map(Path::to_path_buf))
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("configuration error in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
