use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod info;

/// igornx - Igor Pro wave decoder and entry normalizer
#[derive(Parser)]
#[command(name = "igornx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize binary waves or one packed experiment into flat entries
    Convert {
        /// Input files (.ibw/.bwav waves, or a single .pxp/.pxt experiment)
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Entry configuration file (TOML or JSON)
        #[arg(short, long, value_name = "FILE")]
        entries: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Skip undefined archive records instead of failing
        #[arg(long)]
        skip_unknown_records: bool,

        /// Decode single-wave files in parallel (requires the parallel feature)
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Write JSON output to this file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Display the header and note of a binary wave
    Info {
        /// Input .ibw file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            inputs,
            entries,
            config,
            skip_unknown_records,
            parallel,
            output,
        } => convert::run(
            inputs,
            entries,
            config,
            skip_unknown_records,
            parallel,
            output,
        ),
        Commands::Info { file } => info::run(file),
    }
}
