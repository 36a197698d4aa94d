use crate::processors::OverflowPolicy;
use crate::utils::constants::DEFAULT_PORT;
use crate::writers::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "isd-window")]
#[command(about = "Sliding-window min/max aggregation of ISD weather observations by country and year")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate a live line stream over a sliding window
    Stream {
        #[arg(short, long, help = "Station history CSV (isd-history.csv)")]
        stations: PathBuf,

        #[arg(long, help = "Connect to this host for the observation stream")]
        host: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[arg(short, long, conflicts_with = "host", help = "Read observations from a file instead of the network")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Configuration file (TOML, YAML or JSON)")]
        config: Option<PathBuf>,

        #[arg(long)]
        window_length_ms: Option<u64>,

        #[arg(long)]
        tick_interval_ms: Option<u64>,

        #[arg(long, help = "Cap on buffered observations [default: unbounded]")]
        max_buffered: Option<usize>,

        #[arg(long, value_enum)]
        overflow_policy: Option<OverflowPolicy>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Aggregate a whole observation file by country and year
    Aggregate {
        #[arg(short, long, help = "Station history CSV (isd-history.csv)")]
        stations: PathBuf,

        #[arg(short, long, help = "ISD observation file")]
        weather: PathBuf,

        #[arg(short, long, help = "Output file for country,year,min/max lines")]
        output: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, default_value = "false")]
        mmap: bool,
    },

    /// Parse an observation file and report problems without writing output
    Validate {
        #[arg(short, long, help = "Station history CSV, to count unknown stations")]
        stations: Option<PathBuf>,

        #[arg(short, long, help = "ISD observation file")]
        weather: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },
}
