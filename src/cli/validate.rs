use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Validate store integrity
pub fn run(file: PathBuf) -> Result<()> {
    use mrdstore::validator::validate_store;

    info!("MRD Store Validator");
    info!("===================");
    info!("File: {}", file.display());
    info!("");

    match validate_store(&file) {
        Ok(report) => {
            print!("{}", report.format_colored());

            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    }
}
