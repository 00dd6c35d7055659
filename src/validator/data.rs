use crate::acquisition::Acquisition;
use crate::counters::EncodingDimension;
use crate::dataset::DatasetError;
use crate::document::HeaderDocument;
use crate::store::{LabelIndex, StoreError, StoreFile};

use super::{ValidationCheck, ValidationReport};

/// Findings listed per check before the rest are only counted
const MAX_LISTED: usize = 5;

/// Collects findings for one check
#[derive(Default)]
struct Findings {
    count: usize,
    listed: Vec<String>,
}

impl Findings {
    fn push(&mut self, finding: String) {
        self.count += 1;
        if self.listed.len() < MAX_LISTED {
            self.listed.push(finding);
        }
    }

    fn message(&self) -> String {
        let mut msg = self.listed.join("; ");
        if self.count > self.listed.len() {
            msg.push_str(&format!(" (and {} more)", self.count - self.listed.len()));
        }
        msg
    }

    fn into_check(self, name: String, fail: bool) -> ValidationCheck {
        if self.count == 0 {
            ValidationCheck::ok(name)
        } else if fail {
            ValidationCheck::failed(name, self.message())
        } else {
            ValidationCheck::warning(name, self.message())
        }
    }
}

/// Step 3: decode every acquisition and check it against its neighbours and the document
pub(crate) fn check_acquisitions(
    store: &StoreFile,
    label: &str,
    index: &LabelIndex,
    document: Option<&HeaderDocument>,
    report: &mut ValidationReport,
) -> Result<(), DatasetError> {
    let mut undecodable = Findings::default();
    let mut scan_order = Findings::default();
    let mut out_of_limits = Findings::default();
    let mut bad_encoding_ref = Findings::default();
    let mut channels = Findings::default();

    let receiver_channels =
        document.and_then(|doc| doc.acquisition_system_information.receiver_channels);
    let mut previous_scan: Option<u32> = None;

    for (i, frame) in index.acquisitions.iter().enumerate() {
        let body = match store.read_body(frame) {
            Ok(body) => body,
            Err(StoreError::Corrupt { reason, .. }) => {
                undecodable.push(format!("#{}: {}", i, reason));
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let acq = match Acquisition::decode(&body) {
            Ok(acq) => acq,
            Err(e) => {
                undecodable.push(format!("#{}: {}", i, e));
                continue;
            }
        };
        let header = acq.header();

        if let Some(prev) = previous_scan {
            if header.scan_counter <= prev {
                scan_order.push(format!(
                    "#{}: scan_counter {} after {}",
                    i, header.scan_counter, prev
                ));
            }
        }
        previous_scan = Some(header.scan_counter);

        if let Some(doc) = document {
            match doc.encoding_for(header.encoding_space_ref) {
                Some(encoding) => {
                    for (dim, limit) in encoding.encoding_limits.iter() {
                        // Step 0 is the readout sample index, rarely filled in
                        if dim == EncodingDimension::KspaceEncodeStep0 {
                            continue;
                        }
                        let value = header.idx.get(dim);
                        if !limit.contains(value) {
                            out_of_limits.push(format!(
                                "#{}: {} = {} outside [{}, {}]",
                                i, dim, value, limit.minimum, limit.maximum
                            ));
                        }
                    }
                }
                None => bad_encoding_ref.push(format!(
                    "#{}: encoding_space_ref {} but {} encodings declared",
                    i,
                    header.encoding_space_ref,
                    doc.encoding.len()
                )),
            }
        }

        if let Some(receivers) = receiver_channels {
            if header.active_channels > receivers {
                channels.push(format!(
                    "#{}: {} active channels, {} receiver channels",
                    i, header.active_channels, receivers
                ));
            }
        }
    }

    let total = index.acquisitions.len();
    let mut checks = vec![
        undecodable.into_check(
            format!("{} acquisitions decode with valid headers", total),
            true,
        ),
        scan_order.into_check("scan counters increase".to_string(), false),
    ];
    if document.is_some() {
        checks.push(bad_encoding_ref.into_check("encoding references resolve".to_string(), false));
        checks.push(out_of_limits.into_check("counters within encoding limits".to_string(), false));
    }
    if receiver_channels.is_some() {
        checks.push(channels.into_check("channels within receiver channels".to_string(), false));
    }
    for check in checks {
        report.add_check(check.in_dataset(label));
    }

    Ok(())
}
