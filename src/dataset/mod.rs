//! # Dataset Module
//!
//! A [`Dataset`] is a named, append-only sequence of acquisitions plus at most
//! one header document, living inside a store file. Several datasets may share
//! one store; each is addressed by its label.
//!
//! ## Lifecycle
//!
//! ```text
//! create / open ──► Writable ──write_header_document──► DocumentWritten
//!                       │                                     │
//!                       └───────────────close─────────────────┴──► Closed
//! ```
//!
//! Acquisitions can be appended in both open states. After [`Dataset::close`]
//! every operation fails with [`DatasetError::Closed`]. Dropping an open handle
//! releases it as well, syncing on a best-effort basis.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mrdstore::prelude::*;
//!
//! let mut dataset = Dataset::create("scan.mrd", "dataset")?;
//!
//! let header = AcquisitionHeader::builder(256, 4)
//!     .flags(AcquisitionFlag::FirstInSlice | AcquisitionFlag::FirstInRepetition)
//!     .build();
//! let samples = vec![Complex32::new(0.0, 0.0); 256 * 4];
//! let acq = Acquisition::new(header, &samples, None)?;
//! dataset.append(&acq)?;
//!
//! let stats = dataset.close()?;
//! println!("{}", stats);
//!
//! let dataset = Dataset::open_read_only("scan.mrd", "dataset")?;
//! for acq in dataset.acquisitions() {
//!     let acq = acq?;
//!     println!("scan {}", acq.header().scan_counter);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod stats;


pub use error::DatasetError;
pub use stats::DatasetStats;

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::acquisition::Acquisition;
use crate::document::HeaderDocument;
use crate::store::{
    FrameKind, FrameRef, LabelIndex, StoreConfig, StoreFile, SyncPolicy, MAX_LABEL_LEN,
};

/// Lifecycle state of a dataset handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetState {
    /// Open, no header document yet
    Writable,
    /// Open, header document present
    DocumentWritten,
    /// Released; every operation fails
    Closed,
}

impl fmt::Display for DatasetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetState::Writable => "writable",
            DatasetState::DocumentWritten => "document written",
            DatasetState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Handle to one dataset inside a store file
pub struct Dataset {
    store: Option<StoreFile>,
    path: PathBuf,
    name: String,
    read_only: bool,
    acquisitions: Vec<FrameRef>,
    document: Option<FrameRef>,
    state: DatasetState,
    acquisitions_appended: usize,
    bytes_appended: u64,
}

impl Dataset {
    /// Create a new store file containing one dataset
    ///
    /// Fails with [`DatasetError::AlreadyExists`] if anything exists at `path`.
    pub fn create(path: impl AsRef<Path>, name: &str) -> Result<Self, DatasetError> {
        Self::create_with_config(path, name, &StoreConfig::default())
    }

    /// [`create`](Self::create) with explicit configuration
    pub fn create_with_config(
        path: impl AsRef<Path>,
        name: &str,
        config: &StoreConfig,
    ) -> Result<Self, DatasetError> {
        Self::create_impl(path.as_ref(), name, config, false)
    }

    /// Create a new store file, replacing any existing file at `path`
    pub fn create_truncate(path: impl AsRef<Path>, name: &str) -> Result<Self, DatasetError> {
        Self::create_truncate_with_config(path, name, &StoreConfig::default())
    }

    /// [`create_truncate`](Self::create_truncate) with explicit configuration
    pub fn create_truncate_with_config(
        path: impl AsRef<Path>,
        name: &str,
        config: &StoreConfig,
    ) -> Result<Self, DatasetError> {
        Self::create_impl(path.as_ref(), name, config, true)
    }

    fn create_impl(
        path: &Path,
        name: &str,
        config: &StoreConfig,
        truncate: bool,
    ) -> Result<Self, DatasetError> {
        validate_name(name)?;

        let mut store = StoreFile::create(path, config, truncate)?;
        store.append(FrameKind::Declaration, name, &[])?;
        info!("Created dataset '{}' in {}", name, path.display());

        Ok(Self::from_parts(store, name, false, LabelIndex::default()))
    }

    /// Declare a new dataset in an existing store
    ///
    /// Fails with [`DatasetError::NotFound`] if the store is missing and
    /// [`DatasetError::AlreadyExists`] if the label is already declared.
    pub fn add_to_store(path: impl AsRef<Path>, name: &str) -> Result<Self, DatasetError> {
        Self::add_to_store_with_config(path, name, &StoreConfig::default())
    }

    /// [`add_to_store`](Self::add_to_store) with explicit configuration
    pub fn add_to_store_with_config(
        path: impl AsRef<Path>,
        name: &str,
        config: &StoreConfig,
    ) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        validate_name(name)?;

        let (mut store, scan) = StoreFile::open(path, config, true)?;
        let index = LabelIndex::collect(&scan.frames, name);
        if index.declared {
            return Err(DatasetError::AlreadyExists(format!(
                "dataset '{}' in {}",
                name,
                path.display()
            )));
        }

        store.append(FrameKind::Declaration, name, &[])?;
        info!("Added dataset '{}' to {}", name, path.display());

        Ok(Self::from_parts(store, name, false, index))
    }

    /// Open an existing dataset for reading and appending
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self, DatasetError> {
        Self::open_with_config(path, name, &StoreConfig::default())
    }

    /// [`open`](Self::open) with explicit configuration
    pub fn open_with_config(
        path: impl AsRef<Path>,
        name: &str,
        config: &StoreConfig,
    ) -> Result<Self, DatasetError> {
        Self::open_impl(path.as_ref(), name, config, false)
    }

    /// Open an existing dataset for reading only
    ///
    /// Mutating calls on the handle fail with [`DatasetError::ReadOnly`].
    pub fn open_read_only(path: impl AsRef<Path>, name: &str) -> Result<Self, DatasetError> {
        Self::open_read_only_with_config(path, name, &StoreConfig::default())
    }

    /// [`open_read_only`](Self::open_read_only) with explicit configuration
    pub fn open_read_only_with_config(
        path: impl AsRef<Path>,
        name: &str,
        config: &StoreConfig,
    ) -> Result<Self, DatasetError> {
        Self::open_impl(path.as_ref(), name, config, true)
    }

    fn open_impl(
        path: &Path,
        name: &str,
        config: &StoreConfig,
        read_only: bool,
    ) -> Result<Self, DatasetError> {
        let (store, scan) = StoreFile::open(path, config, !read_only)?;
        let index = LabelIndex::collect(&scan.frames, name);
        if !index.declared {
            return Err(DatasetError::NotFound(format!(
                "dataset '{}' in {}",
                name,
                path.display()
            )));
        }
        if index.extra_documents > 0 {
            warn!(
                "Dataset '{}' in {} has {} extra header documents; using the first",
                name,
                path.display(),
                index.extra_documents
            );
        }

        let dataset = Self::from_parts(store, name, read_only, index);
        info!(
            "Opened dataset '{}' in {} ({} acquisitions{})",
            name,
            path.display(),
            dataset.acquisition_count(),
            if read_only { ", read-only" } else { "" }
        );
        Ok(dataset)
    }

    fn from_parts(store: StoreFile, name: &str, read_only: bool, index: LabelIndex) -> Self {
        let state = if index.document.is_some() {
            DatasetState::DocumentWritten
        } else {
            DatasetState::Writable
        };

        Self {
            path: store.path().to_path_buf(),
            store: Some(store),
            name: name.to_string(),
            read_only,
            acquisitions: index.acquisitions,
            document: index.document,
            state,
            acquisitions_appended: 0,
            bytes_appended: 0,
        }
    }

    fn store(&self) -> Result<&StoreFile, DatasetError> {
        self.store.as_ref().ok_or(DatasetError::Closed)
    }

    fn writable_store(&mut self) -> Result<&mut StoreFile, DatasetError> {
        let store = self.store.as_mut().ok_or(DatasetError::Closed)?;
        if self.read_only {
            return Err(DatasetError::ReadOnly);
        }
        Ok(store)
    }

    /// Append one acquisition, returning its index
    ///
    /// The header is validated before anything is written. If the write fails
    /// the store is rolled back and [`acquisition_count`](Self::acquisition_count)
    /// is unchanged.
    pub fn append(&mut self, acquisition: &Acquisition) -> Result<usize, DatasetError> {
        self.writable_store()?;
        acquisition.header().validate()?;

        let body = acquisition.encode();
        let name = self.name.clone();
        let frame = self
            .writable_store()?
            .append(FrameKind::Acquisition, &name, &body)?;

        let index = self.acquisitions.len();
        self.acquisitions.push(frame);
        self.acquisitions_appended += 1;
        self.bytes_appended += body.len() as u64;

        debug!(
            "Appended acquisition {} to '{}' (scan {}, {} bytes)",
            index,
            self.name,
            acquisition.header().scan_counter,
            body.len()
        );
        Ok(index)
    }

    /// Read the acquisition at `index`
    ///
    /// Every call returns an independent copy.
    pub fn read_acquisition(&self, index: usize) -> Result<Acquisition, DatasetError> {
        let store = self.store()?;
        let frame = self
            .acquisitions
            .get(index)
            .ok_or(DatasetError::OutOfRange {
                index,
                count: self.acquisitions.len(),
            })?;

        let body = store.read_body(frame)?;
        Acquisition::decode(&body).map_err(|e| {
            DatasetError::Corrupt(format!(
                "acquisition {} of '{}' at offset {}: {}",
                index, self.name, frame.offset, e
            ))
        })
    }

    /// Iterate over all acquisitions in index order
    pub fn acquisitions(&self) -> Acquisitions<'_> {
        Acquisitions {
            dataset: self,
            next: 0,
        }
    }

    /// Number of acquisitions, 0 once the dataset is closed
    pub fn acquisition_count(&self) -> usize {
        match self.store {
            Some(_) => self.acquisitions.len(),
            None => 0,
        }
    }

    /// Write the header document
    ///
    /// The document is validated first. It can be written once per dataset.
    pub fn write_header_document(&mut self, document: &HeaderDocument) -> Result<(), DatasetError> {
        self.writable_store()?;
        if self.document.is_some() {
            return Err(DatasetError::AlreadyWritten);
        }
        document.validate()?;

        let json = document.to_json()?;
        let name = self.name.clone();
        let frame = self
            .writable_store()?
            .append(FrameKind::Document, &name, json.as_bytes())?;

        self.document = Some(frame);
        self.state = DatasetState::DocumentWritten;
        info!(
            "Wrote header document for '{}' ({} bytes)",
            self.name,
            json.len()
        );
        Ok(())
    }

    /// Read the header document
    pub fn read_header_document(&self) -> Result<HeaderDocument, DatasetError> {
        let store = self.store()?;
        let frame = self.document.as_ref().ok_or(DatasetError::NotPresent)?;

        let body = store.read_body(frame)?;
        let text = String::from_utf8(body).map_err(|_| {
            DatasetError::Corrupt(format!("header document of '{}' is not UTF-8", self.name))
        })?;
        HeaderDocument::from_json(&text).map_err(|e| {
            DatasetError::Corrupt(format!("header document of '{}': {}", self.name, e))
        })
    }

    /// Whether a header document has been written, false once the dataset is closed
    pub fn has_header_document(&self) -> bool {
        self.store.is_some() && self.document.is_some()
    }

    /// Pick up records appended through other handles since this one was opened
    ///
    /// Returns the number of new acquisitions. Torn tails are ignored.
    pub fn refresh(&mut self) -> Result<usize, DatasetError> {
        let store = self.store.as_mut().ok_or(DatasetError::Closed)?;
        let scan = store.scan_from(store.len())?;
        store.set_scanned_end(scan.end);

        let mut index = LabelIndex {
            declared: true,
            acquisitions: Vec::new(),
            document: self.document,
            extra_documents: 0,
        };
        index.extend(&scan.frames, &self.name);

        let added = index.acquisitions.len();
        self.acquisitions.extend(index.acquisitions);
        if self.document.is_none() && index.document.is_some() {
            self.document = index.document;
            self.state = DatasetState::DocumentWritten;
        }

        if added > 0 {
            debug!("Refreshed '{}': {} new acquisitions", self.name, added);
        }
        Ok(added)
    }

    /// Sync per the store configuration and release the handle
    ///
    /// The handle is released even if the final sync fails.
    pub fn close(&mut self) -> Result<DatasetStats, DatasetError> {
        let store = self.store.take().ok_or(DatasetError::Closed)?;
        self.state = DatasetState::Closed;

        if !self.read_only && store.config().sync != SyncPolicy::Never {
            store.sync()?;
        }

        let stats = DatasetStats {
            name: self.name.clone(),
            acquisition_count: self.acquisitions.len(),
            acquisitions_appended: self.acquisitions_appended,
            bytes_appended: self.bytes_appended,
            has_header_document: self.document.is_some(),
            store_size_bytes: store.len(),
        };
        info!("Closed {}", stats);
        Ok(stats)
    }

    /// Dataset label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lifecycle state
    pub fn state(&self) -> DatasetState {
        self.state
    }

    /// Whether mutations are rejected
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        let Some(store) = self.store.take() else {
            return;
        };
        if self.read_only {
            return;
        }

        warn!(
            "Dataset '{}' in {} dropped without close",
            self.name,
            self.path.display()
        );
        if store.config().sync != SyncPolicy::Never {
            if let Err(e) = store.sync() {
                warn!("Failed to sync {} on drop: {}", self.path.display(), e);
            }
        }
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("read_only", &self.read_only)
            .field("acquisitions", &self.acquisitions.len())
            .field("has_header_document", &self.document.is_some())
            .finish()
    }
}

/// Iterator over the acquisitions of a dataset, see [`Dataset::acquisitions`]
pub struct Acquisitions<'a> {
    dataset: &'a Dataset,
    next: usize,
}

impl Iterator for Acquisitions<'_> {
    type Item = Result<Acquisition, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        let count = self.dataset.acquisitions.len();
        if self.next >= count {
            return None;
        }
        let result = self.dataset.read_acquisition(self.next);
        self.next = match result {
            Err(DatasetError::Closed) => count,
            _ => self.next + 1,
        };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.acquisitions.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = Result<Acquisition, DatasetError>;
    type IntoIter = Acquisitions<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.acquisitions()
    }
}

fn validate_name(name: &str) -> Result<(), DatasetError> {
    if name.is_empty() {
        return Err(DatasetError::InvalidName("name is empty".to_string()));
    }
    if name.len() > MAX_LABEL_LEN {
        return Err(DatasetError::InvalidName(format!(
            "name is {} bytes, limit is {}",
            name.len(),
            MAX_LABEL_LEN
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(DatasetError::InvalidName(format!(
            "name {:?} contains control characters",
            name
        )));
    }
    Ok(())
}
