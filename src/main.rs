//! # igornx
//!
//! A command-line tool for decoding Igor Pro waves and normalizing them into
//! flat, path-keyed entries.
//!
//! ## Usage
//!
//! ```bash
//! # Normalize binary waves, one entry per file
//! igornx convert scan_1.ibw scan_2.ibw -o entries.json
//!
//! # Normalize a packed experiment with an entry configuration
//! igornx convert experiment.pxp --entries entries.toml
//!
//! # Inspect a binary wave
//! igornx info scan_1.ibw
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
