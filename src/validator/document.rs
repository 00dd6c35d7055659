use crate::dataset::DatasetError;
use crate::document::HeaderDocument;
use crate::store::{LabelIndex, StoreError, StoreFile};

use super::{ValidationCheck, ValidationReport};

/// Step 2: presence, parse and value rules of one dataset's header document
pub(crate) fn check_document(
    store: &StoreFile,
    label: &str,
    index: &LabelIndex,
    report: &mut ValidationReport,
) -> Result<Option<HeaderDocument>, DatasetError> {
    let name = "header document";

    let Some(frame) = index.document.as_ref() else {
        report.add_check(
            ValidationCheck::warning(name, "No header document; acquisitions cannot be interpreted")
                .in_dataset(label),
        );
        return Ok(None);
    };

    if index.extra_documents > 0 {
        report.add_check(
            ValidationCheck::warning(
                "single header document",
                format!(
                    "{} additional header documents are ignored",
                    index.extra_documents
                ),
            )
            .in_dataset(label),
        );
    }

    let body = match store.read_body(frame) {
        Ok(body) => body,
        Err(StoreError::Corrupt { reason, .. }) => {
            report.add_check(ValidationCheck::failed(name, reason).in_dataset(label));
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let document = match std::str::from_utf8(&body)
        .map_err(|e| e.to_string())
        .and_then(|text| HeaderDocument::from_json(text).map_err(|e| e.to_string()))
    {
        Ok(document) => document,
        Err(reason) => {
            report.add_check(ValidationCheck::failed(name, reason).in_dataset(label));
            return Ok(None);
        }
    };
    report.add_check(ValidationCheck::ok(name).in_dataset(label));

    let violations = document.violations();
    let schema = if violations.is_empty() {
        ValidationCheck::ok("header document schema")
    } else {
        ValidationCheck::failed("header document schema", violations.join("; "))
    };
    report.add_check(schema.in_dataset(label));

    Ok(Some(document))
}
