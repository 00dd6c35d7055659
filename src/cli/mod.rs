use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod demo;
mod dump;
mod header;
mod info;
mod validate;

pub use demo::DemoArgs;

/// mrdstore - Raw MR acquisition store tool
#[derive(Parser)]
#[command(name = "mrdstore")]
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
    /// Write a deterministic Cartesian demo scan
    Demo(DemoArgs),

    /// List the datasets of a store file
    Info {
        /// Store file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print one acquisition header as JSON
    Dump {
        /// Store file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dataset label
        #[arg(short, long, default_value = "dataset")]
        dataset: String,

        /// Acquisition index
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        /// Also print the first samples of every channel
        #[arg(long, value_name = "N")]
        samples: Option<usize>,
    },

    /// Print the header document as JSON
    Header {
        /// Store file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dataset label
        #[arg(short, long, default_value = "dataset")]
        dataset: String,
    },

    /// Validate store integrity and dataset consistency
    Validate {
        /// Store file path
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
        Commands::Demo(args) => demo::run(args),
        Commands::Info { file } => info::run(file),
        Commands::Dump {
            file,
            dataset,
            index,
            samples,
        } => dump::run(file, &dataset, index, samples),
        Commands::Header { file, dataset } => header::run(file, &dataset),
        Commands::Validate { file } => validate::run(file),
    }
}
