use std::collections::BTreeSet;
use std::path::Path;

use crate::dataset::DatasetError;
use crate::store::{declared_labels, FrameKind, Scan, StoreConfig, StoreError, StoreFile};

use super::{ValidationCheck, ValidationReport};

/// Step 1: preamble, frames, torn tail and declarations
///
/// Returns `None` when the store cannot be scanned; the failure is in the report.
pub(crate) fn check_structure(
    path: &Path,
    report: &mut ValidationReport,
) -> Result<Option<(StoreFile, Scan)>, DatasetError> {
    if !path.exists() {
        report.add_check(ValidationCheck::failed(
            "Store exists",
            format!("Path does not exist: {}", path.display()),
        ));
        return Err(DatasetError::NotFound(path.display().to_string()));
    }
    if !path.is_file() {
        report.add_check(ValidationCheck::failed(
            "Store exists",
            "Path is not a regular file",
        ));
        return Ok(None);
    }
    report.add_check(ValidationCheck::ok("Store exists"));

    let (store, scan) = match StoreFile::open(path, &StoreConfig::default(), false) {
        Ok(opened) => opened,
        Err(StoreError::Corrupt { offset, reason }) => {
            let name = if offset == 0 {
                "Store preamble"
            } else {
                "Frame structure"
            };
            report.add_check(ValidationCheck::failed(
                name,
                format!("{} (offset {})", reason, offset),
            ));
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    report.add_check(ValidationCheck::ok("Store preamble"));
    report.add_check(ValidationCheck::ok(format!(
        "Frame structure ({} frames)",
        scan.frames.len()
    )));

    if scan.torn_bytes() > 0 {
        report.add_check(ValidationCheck::warning(
            "Torn tail",
            format!(
                "{} bytes after offset {} belong to an interrupted append and will be discarded by the next writer",
                scan.torn_bytes(),
                scan.end
            ),
        ));
    } else {
        report.add_check(ValidationCheck::ok("No torn tail"));
    }

    let labels = declared_labels(&scan.frames);
    if labels.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Dataset declarations",
            "Store declares no datasets",
        ));
    } else {
        report.add_check(ValidationCheck::ok(format!(
            "Dataset declarations ({}: {})",
            labels.len(),
            labels.join(", ")
        )));
    }

    // Records must follow the declaration of their label
    let mut declared = BTreeSet::new();
    let mut orphans = BTreeSet::new();
    for scanned in &scan.frames {
        match scanned.frame.kind {
            FrameKind::Declaration => {
                if !declared.insert(scanned.label.as_str()) {
                    report.add_check(
                        ValidationCheck::warning(
                            "declaration",
                            format!("Declared again at offset {}", scanned.frame.offset),
                        )
                        .in_dataset(&scanned.label),
                    );
                }
            }
            _ if !declared.contains(scanned.label.as_str()) => {
                orphans.insert(scanned.label.as_str());
            }
            _ => {}
        }
    }
    if orphans.is_empty() {
        report.add_check(ValidationCheck::ok("All records belong to declared datasets"));
    } else {
        report.add_check(ValidationCheck::failed(
            "All records belong to declared datasets",
            format!(
                "Records precede the declaration of: {}",
                orphans.into_iter().collect::<Vec<_>>().join(", ")
            ),
        ));
    }

    Ok(Some((store, scan)))
}
