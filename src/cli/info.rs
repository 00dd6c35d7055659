use anyhow::{Context, Result};
use std::path::PathBuf;

use mrdstore::store::{inspect, STORE_FORMAT_VERSION};

/// Display information about a store file
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let info = inspect(&file).context("Failed to read store")?;

    println!("MRD Store Information");
    println!("=====================");
    println!("File: {}", info.path.display());
    println!();

    println!("File Statistics:");
    println!("  Format version: {}", STORE_FORMAT_VERSION);
    println!(
        "  File size: {} bytes ({:.2} MB)",
        info.file_size,
        info.file_size as f64 / 1024.0 / 1024.0
    );
    println!("  Frames: {}", info.frame_count);
    if info.torn_bytes > 0 {
        println!(
            "  Torn tail: {} bytes (removed by the next writer)",
            info.torn_bytes
        );
    }
    println!();

    println!("Datasets:");
    if info.datasets.is_empty() {
        println!("  <none>");
    }
    for dataset in &info.datasets {
        println!(
            "  {}: {} acquisitions, header document {}",
            dataset.name,
            dataset.acquisition_count,
            if dataset.has_header_document {
                "present"
            } else {
                "missing"
            }
        );
    }

    Ok(())
}
