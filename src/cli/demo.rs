use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Args;
use log::info;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use mrdstore::prelude::*;

use super::config::Config;

const DEFAULT_DATASET: &str = "dataset";
const DEFAULT_REPETITIONS: u32 = 5;
const DEFAULT_LINES: u32 = 256;
const DEFAULT_SAMPLES: u32 = 256;
const DEFAULT_CHANNELS: u32 = 4;

/// Arguments of the demo command
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Output store file path
    #[arg(value_name = "OUTPUT", default_value = "demo_scan.mrd")]
    output: PathBuf,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of repetitions
    #[arg(long)]
    repetitions: Option<u32>,

    /// Phase encoding lines per repetition
    #[arg(long)]
    lines: Option<u32>,

    /// Readout samples per line
    #[arg(long)]
    samples: Option<u32>,

    /// Receiver channels
    #[arg(long)]
    channels: Option<u32>,

    /// Dataset label
    #[arg(long)]
    dataset: Option<String>,

    /// Replace an existing file at OUTPUT
    #[arg(short, long)]
    force: bool,
}

/// Geometry of the demo scan after config and flags are merged
#[derive(Debug, Clone, PartialEq)]
struct ScanPlan {
    dataset: String,
    repetitions: u32,
    lines: u32,
    samples: u32,
    channels: u32,
}

impl ScanPlan {
    fn resolve(args: &DemoArgs, config: &Config) -> Result<Self> {
        let plan = Self {
            dataset: args
                .dataset
                .clone()
                .or_else(|| config.demo.dataset.clone())
                .unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            repetitions: args
                .repetitions
                .or(config.demo.repetitions)
                .unwrap_or(DEFAULT_REPETITIONS),
            lines: args.lines.or(config.demo.lines).unwrap_or(DEFAULT_LINES),
            samples: args.samples.or(config.demo.samples).unwrap_or(DEFAULT_SAMPLES),
            channels: args
                .channels
                .or(config.demo.channels)
                .unwrap_or(DEFAULT_CHANNELS),
        };

        if plan.repetitions == 0 || plan.lines == 0 || plan.samples == 0 || plan.channels == 0 {
            bail!("Demo scan dimensions must be non-zero: {:?}", plan);
        }
        Ok(plan)
    }

    fn acquisition_count(&self) -> u64 {
        u64::from(self.repetitions) * u64::from(self.lines)
    }
}

/// Write the Cartesian demo scan
pub fn run(args: DemoArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let plan = ScanPlan::resolve(&args, &config)?;

    info!("mrdstore demo scan");
    info!("==================");
    info!(
        "{} repetitions x {} lines, {} samples, {} channels",
        plan.repetitions, plan.lines, plan.samples, plan.channels
    );

    let stats = write_scan(&args.output, &plan, &config.store, args.force)?;

    println!("{}", stats);
    println!("Output file: {}", args.output.display());
    Ok(())
}

fn write_scan(
    output: &Path,
    plan: &ScanPlan,
    store_config: &StoreConfig,
    force: bool,
) -> Result<DatasetStats> {
    let mut dataset = if force {
        Dataset::create_truncate_with_config(output, &plan.dataset, store_config)
    } else {
        Dataset::create_with_config(output, &plan.dataset, store_config)
    }
    .with_context(|| format!("Failed to create store: {}", output.display()))?;

    dataset
        .write_header_document(&build_document(plan))
        .context("Failed to write header document")?;

    let total = plan.acquisition_count();
    for rep in 0..plan.repetitions {
        for line in 0..plan.lines {
            let acq = build_line(plan, rep, line)?;
            dataset
                .append(&acq)
                .with_context(|| format!("Failed to append repetition {} line {}", rep, line))?;
        }
        info!(
            "  Written repetition {} ({} / {} acquisitions)",
            rep + 1,
            u64::from(rep + 1) * u64::from(plan.lines),
            total
        );
    }

    dataset.close().context("Failed to close dataset")
}

/// Flags of line `line` within one repetition
fn line_flags(line: u32, lines: u32) -> FlagSet {
    if line == 0 {
        AcquisitionFlag::LastInEncodeStep1
            | AcquisitionFlag::FirstInSlice
            | AcquisitionFlag::FirstInRepetition
    } else if line == lines - 1 {
        AcquisitionFlag::LastInEncodeStep1
            | AcquisitionFlag::LastInSlice
            | AcquisitionFlag::LastInRepetition
    } else {
        FlagSet::new()
    }
}

fn build_line(plan: &ScanPlan, rep: u32, line: u32) -> Result<Acquisition> {
    let mut idx = EncodingCounters::new();
    idx.kspace_encode_step_1 = line;
    idx.repetition = rep;

    let header = AcquisitionHeader::builder(plan.samples, plan.channels)
        .flags(line_flags(line, plan.lines))
        .counters(idx)
        .scan_counter(rep * plan.lines + line)
        .center_sample(plan.samples / 2)
        .available_channels(plan.channels)
        .directions([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0])
        .build();

    let samples = line_samples(plan, rep, line);
    Ok(Acquisition::from_parts(header, samples, None)?)
}

/// k-space of a centered square covering half the field of view
///
/// Each channel sees the object with a different constant phase, and each
/// repetition adds a small deterministic offset in place of noise.
fn line_samples(plan: &ScanPlan, rep: u32, line: u32) -> Vec<Complex32> {
    let ky = line as f32 - (plan.lines / 2) as f32;
    let wy = sinc(ky / 2.0);
    let offset = 0.01 * rep as f32;

    let mut samples = Vec::with_capacity((plan.samples * plan.channels) as usize);
    for channel in 0..plan.channels {
        let coil_phase = 2.0 * PI * channel as f32 / plan.channels as f32;
        for s in 0..plan.samples {
            let kx = s as f32 - (plan.samples / 2) as f32;
            let magnitude = 0.25 * (plan.samples * plan.lines) as f32 * sinc(kx / 2.0) * wy;
            samples.push(
                Complex32::from_polar(magnitude, coil_phase) + Complex32::new(offset, -offset),
            );
        }
    }
    samples
}

fn sinc(x: f32) -> f32 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn build_document(plan: &ScanPlan) -> HeaderDocument {
    let space = EncodingSpace::new(
        MatrixSize::new(plan.samples, plan.lines, 1),
        FieldOfView::new(256.0, 256.0, 5.0),
    );
    let limits = EncodingLimits {
        kspace_encoding_step_0: Some(Limit::span(plan.samples)),
        kspace_encoding_step_1: Some(Limit::span(plan.lines)),
        repetition: Some(Limit::new(0, 0, plan.repetitions - 1)),
        slice: Some(Limit::new(0, 0, 0)),
        ..Default::default()
    };

    let mut document = HeaderDocument::new(
        AcquisitionSystemInformation {
            receiver_channels: Some(plan.channels),
            system_field_strength_t: Some(3.0),
            ..Default::default()
        },
        ExperimentalConditions::new(128_000_000),
        Encoding::new(Trajectory::Cartesian, space, limits),
    );

    let now = Local::now();
    document.version = Some(1);
    document.measurement_information = Some(MeasurementInformation {
        measurement_id: Some(uuid::Uuid::new_v4().to_string()),
        series_date: Some(now.date_naive()),
        series_time: Some(now.time()),
        patient_position: Some("HFS".to_string()),
        protocol_name: Some("mrdstore demo".to_string()),
        ..Default::default()
    });
    document
}
