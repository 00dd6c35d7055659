//! # mrdstore - Raw MR Acquisition Store
//!
//! `mrdstore` is a persistent, append-only container for raw magnetic resonance
//! acquisition data. A store holds one or more named datasets; each dataset is a
//! sequence of acquisitions (one per readout) plus a single header document that
//! describes the scan's geometry and encoding.
//!
//! ## Key Features
//!
//! - **Fixed-layout acquisition headers**: A versioned 400-byte little-endian
//!   header with bit-packed status flags and multi-dimensional encoding counters.
//!
//! - **Incremental writing**: Acquisitions are appended one at a time while the
//!   scan runs; every appended record is immediately readable by index.
//!
//! - **Crash tolerance**: Records are checksummed frames. An interrupted append
//!   leaves a torn tail that is ignored on open, never a half-visible record.
//!
//! - **Self-describing**: The header document is stored as JSON with ISMRMRD
//!   header keys and validated before it is written.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mrdstore::prelude::*;
//!
//! let mut dataset = Dataset::create("scan.mrd", "dataset")?;
//!
//! for line in 0..256u32 {
//!     let mut idx = EncodingCounters::new();
//!     idx.kspace_encode_step_1 = line;
//!
//!     let header = AcquisitionHeader::builder(256, 4)
//!         .scan_counter(line)
//!         .counters(idx)
//!         .center_sample(128)
//!         .build();
//!     let samples = vec![Complex32::new(0.0, 0.0); 256 * 4];
//!
//!     dataset.append(&Acquisition::new(header, &samples, None)?)?;
//! }
//!
//! let stats = dataset.close()?;
//! println!("{}", stats);
//! # Ok::<(), mrdstore::dataset::DatasetError>(())
//! ```
//!
//! ## Reading
//!
//! ```rust,no_run
//! use mrdstore::prelude::*;
//!
//! let dataset = Dataset::open_read_only("scan.mrd", "dataset")?;
//! let document = dataset.read_header_document()?;
//! println!("{} encodings", document.encoding.len());
//!
//! for acq in dataset.acquisitions() {
//!     let acq = acq?;
//!     if acq.is_flag_set(AcquisitionFlag::LastInRepetition) {
//!         println!("repetition {} complete", acq.counters().repetition);
//!     }
//! }
//! # Ok::<(), mrdstore::dataset::DatasetError>(())
//! ```
//!
//! ## Modules
//!
//! | module | contents |
//! |---|---|
//! | [`flags`] | acquisition status flags and the 64-bit [`flags::FlagSet`] |
//! | [`counters`] | encoding counters placing an acquisition in the scan |
//! | [`header`] | the fixed-layout acquisition header and its codec |
//! | [`acquisition`] | header plus complex samples and trajectory |
//! | [`document`] | the dataset header document and its value rules |
//! | [`store`] | the framed file format shared by all datasets |
//! | [`dataset`] | the append/read handle |
//! | [`validator`] | deep integrity checks with a printable report |

// Documentation lints
#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod acquisition;
pub mod counters;
pub mod dataset;
pub mod document;
pub mod flags;
pub mod header;
pub mod store;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::acquisition::{Acquisition, AcquisitionError, Complex32};
    pub use crate::counters::{EncodingCounters, EncodingDimension};
    pub use crate::dataset::{Dataset, DatasetError, DatasetState, DatasetStats};
    pub use crate::document::{
        AcquisitionSystemInformation, DocumentError, Encoding, EncodingLimits, EncodingSpace,
        ExperimentalConditions, FieldOfView, HeaderDocument, Limit, MatrixSize,
        MeasurementInformation, SequenceParameters, StudyInformation, SubjectInformation,
        Trajectory, UserParameter, UserParameters,
    };
    pub use crate::flags::{AcquisitionFlag, FlagSet};
    pub use crate::header::{AcquisitionHeader, ACQUISITION_HEADER_SIZE};
    pub use crate::store::{list_datasets, StoreConfig, SyncPolicy};
    pub use crate::validator::{validate_store, ValidationReport};
}
