use anyhow::{Context, Result};
use std::path::PathBuf;

use mrdstore::prelude::*;

/// Print the header document of a dataset
pub fn run(file: PathBuf, dataset: &str) -> Result<()> {
    let dataset = Dataset::open_read_only(&file, dataset)
        .with_context(|| format!("Failed to open dataset '{}' in {}", dataset, file.display()))?;

    let document = dataset
        .read_header_document()
        .with_context(|| format!("Failed to read header document of '{}'", dataset.name()))?;

    println!(
        "{}",
        document
            .to_json_pretty()
            .context("Failed to serialize header document")?
    );
    Ok(())
}
