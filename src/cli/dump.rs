use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;

use mrdstore::prelude::*;

/// Print one acquisition header, and optionally its first samples, as JSON
pub fn run(file: PathBuf, dataset: &str, index: usize, samples: Option<usize>) -> Result<()> {
    let dataset = Dataset::open_read_only(&file, dataset)
        .with_context(|| format!("Failed to open dataset '{}' in {}", dataset, file.display()))?;

    let acq = dataset
        .read_acquisition(index)
        .with_context(|| format!("Failed to read acquisition {}", index))?;
    let header = acq.header();

    let flags: Vec<String> = header.flags.iter().map(|f| f.to_string()).collect();
    let mut output = json!({
        "index": index,
        "header": header,
        "flagNames": flags,
    });

    if let Some(n) = samples {
        let channels: Vec<Vec<[f32; 2]>> = acq
            .channels()
            .map(|channel| channel.iter().take(n).map(|s| [s.re, s.im]).collect())
            .collect();
        output["samples"] = json!(channels);
    }

    let text = serde_json::to_string_pretty(&output).context("Failed to serialize header")?;
    println!("{}", text);
    Ok(())
}
