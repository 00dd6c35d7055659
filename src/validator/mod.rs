//! # Store Validation
//!
//! Deep integrity validation of a store file. Unlike opening a dataset, which
//! stops at the first problem, validation runs every check it can and records
//! the outcome of each in a [`ValidationReport`].
//!
//! ## Checklist
//!
//! 1. **Structure**: preamble, frame scan, torn tail, dataset declarations
//! 2. **Header document** (per dataset): presence, parse, value rules
//! 3. **Acquisitions** (per dataset): every record decodes with a valid header,
//!    scan counters increase, counters lie within the declared encoding limits,
//!    channel counts agree with the receiver channels of the system
//!
//! Structural damage fails the report. Findings that do not prevent reading
//! the data are warnings.
//!
//! ```rust,no_run
//! use mrdstore::validator::validate_store;
//!
//! let report = validate_store("scan.mrd")?;
//! println!("{}", report.format_colored());
//! if report.has_failures() {
//!     std::process::exit(1);
//! }
//! # Ok::<(), mrdstore::dataset::DatasetError>(())
//! ```

use std::path::Path;

use log::debug;

use crate::dataset::DatasetError;
use crate::store::{declared_labels, LabelIndex};

pub use report::{CheckStatus, Severity, Tally, ValidationCheck, ValidationReport};

mod data;
mod document;
mod report;
mod structure;


/// Validate a store file
///
/// # Errors
///
/// Only [`DatasetError::NotFound`] and I/O failures are returned as errors;
/// structural problems are recorded in the report.
pub fn validate_store(path: impl AsRef<Path>) -> Result<ValidationReport, DatasetError> {
    let path = path.as_ref();
    let mut report = ValidationReport::new(path.display().to_string());

    // 1. Structure
    let Some((store, scan)) = structure::check_structure(path, &mut report)? else {
        return Ok(report);
    };

    for label in declared_labels(&scan.frames) {
        debug!("Validating dataset '{}'", label);
        let index = LabelIndex::collect(&scan.frames, &label);

        // 2. Header document
        let document = document::check_document(&store, &label, &index, &mut report)?;

        // 3. Acquisitions
        data::check_acquisitions(&store, &label, &index, document.as_ref(), &mut report)?;
    }

    Ok(report)
}
