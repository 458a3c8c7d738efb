//! seisread CLI - Load seismological data files and print a summary or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seisread::{
    CatalogFormat, Config, PhaseFormat, Region, Summarize, read_catalog, read_common_receiver,
    read_faults, read_phase, read_station_list,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// seisread - Read earthquake catalogs, phase picks, faults and station lists
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print the full table as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SEISREAD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read an earthquake catalog
    Catalog {
        file: PathBuf,

        /// Catalog layout (dat, xlsx, ...); inferred from the extension if omitted
        #[arg(short, long)]
        format: Option<CatalogFormat>,
    },

    /// Read a phase-pick file
    Phase {
        file: PathBuf,

        /// Hypoinverse-Output or TomoATT-Input
        #[arg(short, long, default_value = "Hypoinverse-Output")]
        format: PhaseFormat,
    },

    /// Read a common-receiver differential-time file
    CommonReceiver {
        file: PathBuf,

        /// Network code prefixed to station names as NET.STA
        #[arg(short, long)]
        network_code: Option<String>,
    },

    /// Read fault traces inside a region
    Faults {
        file: PathBuf,

        /// lon_min,lon_max,lat_min,lat_max
        #[arg(short, long, allow_hyphen_values = true)]
        region: Option<Region>,
    },

    /// Read the station list for an array
    Stations {
        array_name: String,

        /// Directory holding <array_name>.txt
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Discard the first line of the station file
        #[arg(long)]
        skip_header: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    config.validate()?;

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Using config: {:?}", config);

    let json = args.json || config.json;
    let output = run(&args.command, &config, json)?;
    println!("{}", output);

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Run one subcommand and render its table.
fn run(command: &Command, config: &Config, json: bool) -> Result<String> {
    match command {
        Command::Catalog { file, format } => {
            let format = match format {
                Some(format) => *format,
                None => CatalogFormat::from_path(file).with_context(|| {
                    format!(
                        "Cannot infer catalog format from {}; pass --format",
                        file.display()
                    )
                })?,
            };
            let catalog = read_catalog(file, format)
                .with_context(|| format!("Failed to read catalog {}", file.display()))?;
            render(&catalog, json)
        }
        Command::Phase { file, format } => {
            let table = read_phase(file, *format)
                .with_context(|| format!("Failed to read phase file {}", file.display()))?;
            render(&table, json)
        }
        Command::CommonReceiver { file, network_code } => {
            let network_code = network_code.as_deref().or(config.network_code.as_deref());
            let table = read_common_receiver(file, network_code).with_context(|| {
                format!("Failed to read common-receiver file {}", file.display())
            })?;
            render(&table, json)
        }
        Command::Faults { file, region } => {
            let region = region
                .or(config.region)
                .context("No region given; pass --region or set one in the config file")?;
            info!("Filtering faults to region {}", region);
            let table = read_faults(file, &region)
                .with_context(|| format!("Failed to read fault file {}", file.display()))?;
            render(&table, json)
        }
        Command::Stations {
            array_name,
            dir,
            skip_header,
        } => {
            let dir = dir
                .clone()
                .or_else(|| config.station_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let skip_header = *skip_header || config.skip_header;
            let table = read_station_list(&dir, array_name, skip_header)
                .with_context(|| format!("Failed to read stations for {}", array_name))?;
            render(&table, json)
        }
    }
}

/// Render a table as pretty JSON or as its summary.
fn render<T: Serialize + Summarize>(table: &T, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(table).context("Failed to serialize table")
    } else {
        Ok(table.summary().to_string())
    }
}
