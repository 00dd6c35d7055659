//! # Store File
//!
//! Physical layer shared by every dataset in one file. The file is an
//! append-only sequence of checksummed frames after a fixed preamble:
//!
//! ```text
//! {name}.mrd
//! ├── preamble            "MRDSTORE", format version
//! ├── frame: declaration  label "dataset"
//! ├── frame: acquisition  label "dataset", encoded Acquisition
//! ├── frame: acquisition  ...
//! ├── frame: declaration  label "noise"
//! ├── frame: acquisition  label "noise", ...
//! └── frame: document     label "dataset", header document JSON
//! ```
//!
//! Frames of different datasets may interleave. A dataset's acquisitions are
//! its acquisition frames in file order.
//!
//! ## Crash behavior
//!
//! A frame is visible once it is completely on disk and both of its checksums
//! match. A trailing frame that is shorter than a frame header, that runs past
//! the end of the file behind an intact header, or whose payload checksum
//! fails, is a torn tail left by an interrupted append: it is skipped when
//! scanning and removed when the store is next opened for writing. Damage
//! anywhere else, a complete header with a bad checksum included, is reported
//! as corruption.

mod config;
mod error;
mod file;
mod frame;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

pub use config::{StoreConfig, SyncPolicy};
pub use error::StoreError;
pub use frame::{FrameKind, FRAME_HEADER_SIZE, PREAMBLE_SIZE, STORE_FORMAT_VERSION, STORE_MAGIC};

pub(crate) use file::{FrameRef, Scan, ScannedFrame, StoreFile};
pub(crate) use frame::MAX_LABEL_LEN;

/// Summary of one dataset in a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Dataset label
    pub name: String,
    /// Number of complete acquisition records
    pub acquisition_count: usize,
    /// Whether a header document has been written
    pub has_header_document: bool,
}

/// Structural overview of a store file
#[derive(Debug, Clone)]
pub struct StoreInfo {
    /// Path of the store
    pub path: PathBuf,
    /// File size in bytes, torn tail included
    pub file_size: u64,
    /// Number of complete frames
    pub frame_count: usize,
    /// Bytes of torn tail after the last complete frame
    pub torn_bytes: u64,
    /// Declared datasets in declaration order
    pub datasets: Vec<DatasetSummary>,
}

/// Scan a store without modifying it
///
/// # Errors
///
/// [`StoreError::NotFound`] if the file is missing, [`StoreError::Corrupt`] if its
/// structure is damaged.
pub fn inspect(path: impl AsRef<Path>) -> Result<StoreInfo, StoreError> {
    let path = path.as_ref();
    let (_store, scan) = StoreFile::open(path, &StoreConfig::default(), false)?;

    let datasets = declared_labels(&scan.frames)
        .into_iter()
        .map(|name| {
            let index = LabelIndex::collect(&scan.frames, &name);
            DatasetSummary {
                acquisition_count: index.acquisitions.len(),
                has_header_document: index.document.is_some(),
                name,
            }
        })
        .collect();

    Ok(StoreInfo {
        path: path.to_path_buf(),
        file_size: scan.file_len,
        frame_count: scan.frames.len(),
        torn_bytes: scan.torn_bytes(),
        datasets,
    })
}

/// List the datasets declared in a store
pub fn list_datasets(path: impl AsRef<Path>) -> Result<Vec<DatasetSummary>, StoreError> {
    Ok(inspect(path)?.datasets)
}

/// Declared labels in first-declaration order
pub(crate) fn declared_labels(frames: &[ScannedFrame]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for scanned in frames {
        if scanned.frame.kind == FrameKind::Declaration && !labels.contains(&scanned.label) {
            labels.push(scanned.label.clone());
        }
    }
    labels
}

/// Frames belonging to one dataset label
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelIndex {
    pub declared: bool,
    pub acquisitions: Vec<FrameRef>,
    pub document: Option<FrameRef>,
    /// Document frames after the first; only a second writer produces these
    pub extra_documents: usize,
}

impl LabelIndex {
    pub fn collect(frames: &[ScannedFrame], label: &str) -> Self {
        let mut index = Self::default();
        index.extend(frames, label);
        index
    }

    /// Add frames found by a later scan
    pub fn extend(&mut self, frames: &[ScannedFrame], label: &str) {
        for scanned in frames.iter().filter(|f| f.label == label) {
            match scanned.frame.kind {
                FrameKind::Declaration => self.declared = true,
                FrameKind::Acquisition => self.acquisitions.push(scanned.frame),
                FrameKind::Document if self.document.is_none() => {
                    self.document = Some(scanned.frame)
                }
                FrameKind::Document => self.extra_documents += 1,
            }
        }
    }
}
