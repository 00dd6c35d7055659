//! # mrdstore
//!
//! Command-line tool for raw MR acquisition stores.
//!
//! ## Usage
//!
//! ```bash
//! # Write the demo scan
//! mrdstore demo scan.mrd
//!
//! # Inspect it
//! mrdstore info scan.mrd
//! mrdstore header scan.mrd
//! mrdstore dump scan.mrd --index 256
//! mrdstore validate scan.mrd
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
