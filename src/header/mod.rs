//! # Acquisition Header
//!
//! Fixed-size, version-tagged record describing one readout: sample and channel
//! counts, encoding counters, status flags, orientation and timing.
//!
//! Headers are assembled in one step through [`AcquisitionHeaderBuilder`]. The
//! flag word is handed to the builder as a complete [`FlagSet`], so there is no
//! way to set flags on an acquisition and have them silently replaced by a later
//! header assignment.
//!
//! ```rust
//! use mrdstore::flags::AcquisitionFlag;
//! use mrdstore::counters::EncodingCounters;
//! use mrdstore::header::AcquisitionHeader;
//!
//! let mut idx = EncodingCounters::new();
//! idx.kspace_encode_step_1 = 0;
//! idx.repetition = 2;
//!
//! let header = AcquisitionHeader::builder(256, 4)
//!     .center_sample(128)
//!     .scan_counter(512)
//!     .counters(idx)
//!     .flags(AcquisitionFlag::FirstInSlice | AcquisitionFlag::FirstInRepetition)
//!     .build();
//!
//! assert!(header.validate().is_ok());
//! assert_eq!(header.to_bytes().len(), mrdstore::header::ACQUISITION_HEADER_SIZE);
//! ```

mod codec;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::acquisition::AcquisitionError;
use crate::counters::EncodingCounters;
use crate::flags::FlagSet;

pub use codec::ACQUISITION_HEADER_SIZE;

/// Header layout version written and accepted by this crate
pub const ACQUISITION_HEADER_VERSION: u16 = 1;

/// Number of physiology time stamps
pub const PHYS_STAMPS: usize = 3;
/// Number of 64-bit channel mask words (1024 channels)
pub const CHANNEL_MASKS: usize = 16;
/// Number of user integers
pub const USER_INTS: usize = 8;
/// Number of user floats
pub const USER_FLOATS: usize = 8;

/// Header of a single acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionHeader {
    /// Layout version
    pub version: u16,
    /// Status flags
    pub flags: FlagSet,
    /// Unique ID of the measurement this readout belongs to
    pub measurement_uid: u32,
    /// Position in the acquisition space
    pub idx: EncodingCounters,
    /// Monotonic sequence number assigned by the producer
    pub scan_counter: u32,
    /// Acquisition clock stamp
    pub acquisition_time_stamp: u32,
    /// Physiology clock stamps (ECG, breathing, ...)
    pub physiology_time_stamp: [u32; PHYS_STAMPS],
    /// Complex samples per channel
    pub number_of_samples: u32,
    /// Channels available on the receiver
    pub available_channels: u32,
    /// Channels present in the payload
    pub active_channels: u32,
    /// Bitmask of the active receiver channels
    pub channel_mask: [u64; CHANNEL_MASKS],
    /// Samples to discard at the start of the readout
    pub discard_pre: u32,
    /// Samples to discard at the end of the readout
    pub discard_post: u32,
    /// Sample index of the k-space center
    pub center_sample: u32,
    /// Index of the encoding description in the header document
    pub encoding_space_ref: u32,
    /// Trajectory values per sample (0 if no trajectory)
    pub trajectory_dimensions: u32,
    /// Dwell time in microseconds
    pub sample_time_us: f32,
    /// Slice center position (mm)
    pub position: [f32; 3],
    /// Readout direction
    pub read_dir: [f32; 3],
    /// Phase-encode direction
    pub phase_dir: [f32; 3],
    /// Slice direction
    pub slice_dir: [f32; 3],
    /// Patient table offset (mm)
    pub patient_table_position: [f32; 3],
    /// Free user integers
    pub user_int: [i32; USER_INTS],
    /// Free user floats
    pub user_float: [f32; USER_FLOATS],
}

impl Default for AcquisitionHeader {
    fn default() -> Self {
        Self {
            version: ACQUISITION_HEADER_VERSION,
            flags: FlagSet::new(),
            measurement_uid: 0,
            idx: EncodingCounters::new(),
            scan_counter: 0,
            acquisition_time_stamp: 0,
            physiology_time_stamp: [0; PHYS_STAMPS],
            number_of_samples: 0,
            available_channels: 1,
            active_channels: 1,
            channel_mask: [0; CHANNEL_MASKS],
            discard_pre: 0,
            discard_post: 0,
            center_sample: 0,
            encoding_space_ref: 0,
            trajectory_dimensions: 0,
            sample_time_us: 0.0,
            position: [0.0; 3],
            read_dir: [1.0, 0.0, 0.0],
            phase_dir: [0.0, 1.0, 0.0],
            slice_dir: [0.0, 0.0, 1.0],
            patient_table_position: [0.0; 3],
            user_int: [0; USER_INTS],
            user_float: [0.0; USER_FLOATS],
        }
    }
}

impl AcquisitionHeader {
    /// Start building a header for `number_of_samples` samples on `active_channels` channels
    pub fn builder(number_of_samples: u32, active_channels: u32) -> AcquisitionHeaderBuilder {
        AcquisitionHeaderBuilder::new(number_of_samples, active_channels)
    }

    /// Number of complex values the payload must hold
    pub fn sample_count(&self) -> usize {
        self.number_of_samples as usize * self.active_channels as usize
    }

    /// Number of f32 values the trajectory must hold
    pub fn trajectory_len(&self) -> usize {
        self.trajectory_dimensions as usize * self.number_of_samples as usize
    }

    /// Check the header's own consistency
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::MalformedHeader`] if the version is not
    /// [`ACQUISITION_HEADER_VERSION`], if the sample or channel count is zero,
    /// or if the center sample lies beyond the readout.
    pub fn validate(&self) -> Result<(), AcquisitionError> {
        if self.version != ACQUISITION_HEADER_VERSION {
            return Err(AcquisitionError::MalformedHeader(format!(
                "unsupported header version {} (expected {})",
                self.version, ACQUISITION_HEADER_VERSION
            )));
        }
        if self.number_of_samples == 0 {
            return Err(AcquisitionError::MalformedHeader(
                "number_of_samples must be positive".to_string(),
            ));
        }
        if self.active_channels == 0 {
            return Err(AcquisitionError::MalformedHeader(
                "active_channels must be positive".to_string(),
            ));
        }
        if self.center_sample > self.number_of_samples {
            return Err(AcquisitionError::MalformedHeader(format!(
                "center_sample {} exceeds number_of_samples {}",
                self.center_sample, self.number_of_samples
            )));
        }
        Ok(())
    }
}

/// Builder for [`AcquisitionHeader`]
#[derive(Debug, Clone)]
pub struct AcquisitionHeaderBuilder {
    header: AcquisitionHeader,
}

impl AcquisitionHeaderBuilder {
    /// Create a builder with the required counts; everything else takes its default
    pub fn new(number_of_samples: u32, active_channels: u32) -> Self {
        Self {
            header: AcquisitionHeader {
                number_of_samples,
                active_channels,
                available_channels: active_channels,
                ..AcquisitionHeader::default()
            },
        }
    }

    /// Override the layout version
    pub fn version(mut self, version: u16) -> Self {
        self.header.version = version;
        self
    }

    /// Set the complete flag word
    pub fn flags(mut self, flags: impl Into<FlagSet>) -> Self {
        self.header.flags = flags.into();
        self
    }

    /// Set the encoding counters
    pub fn counters(mut self, idx: EncodingCounters) -> Self {
        self.header.idx = idx;
        self
    }

    /// Set the measurement UID
    pub fn measurement_uid(mut self, uid: u32) -> Self {
        self.header.measurement_uid = uid;
        self
    }

    /// Set the scan counter
    pub fn scan_counter(mut self, counter: u32) -> Self {
        self.header.scan_counter = counter;
        self
    }

    /// Set the acquisition and physiology time stamps
    pub fn time_stamps(mut self, acquisition: u32, physiology: [u32; PHYS_STAMPS]) -> Self {
        self.header.acquisition_time_stamp = acquisition;
        self.header.physiology_time_stamp = physiology;
        self
    }

    /// Set the number of channels available on the receiver
    pub fn available_channels(mut self, channels: u32) -> Self {
        self.header.available_channels = channels;
        self
    }

    /// Set the active channel bitmask
    pub fn channel_mask(mut self, mask: [u64; CHANNEL_MASKS]) -> Self {
        self.header.channel_mask = mask;
        self
    }

    /// Set the samples to discard before and after the useful readout
    pub fn discard(mut self, pre: u32, post: u32) -> Self {
        self.header.discard_pre = pre;
        self.header.discard_post = post;
        self
    }

    /// Set the k-space center sample
    pub fn center_sample(mut self, center: u32) -> Self {
        self.header.center_sample = center;
        self
    }

    /// Set the referenced encoding description
    pub fn encoding_space_ref(mut self, index: u32) -> Self {
        self.header.encoding_space_ref = index;
        self
    }

    /// Declare a trajectory with `dimensions` values per sample
    pub fn trajectory_dimensions(mut self, dimensions: u32) -> Self {
        self.header.trajectory_dimensions = dimensions;
        self
    }

    /// Set the dwell time in microseconds
    pub fn sample_time_us(mut self, dwell: f32) -> Self {
        self.header.sample_time_us = dwell;
        self
    }

    /// Set the slice position and patient table offset (mm)
    pub fn position(mut self, position: [f32; 3], table: [f32; 3]) -> Self {
        self.header.position = position;
        self.header.patient_table_position = table;
        self
    }

    /// Set the read, phase and slice direction vectors
    pub fn directions(mut self, read: [f32; 3], phase: [f32; 3], slice: [f32; 3]) -> Self {
        self.header.read_dir = read;
        self.header.phase_dir = phase;
        self.header.slice_dir = slice;
        self
    }

    /// Set the user integers
    pub fn user_int(mut self, values: [i32; USER_INTS]) -> Self {
        self.header.user_int = values;
        self
    }

    /// Set the user floats
    pub fn user_float(mut self, values: [f32; USER_FLOATS]) -> Self {
        self.header.user_float = values;
        self
    }

    /// Finish the header
    pub fn build(self) -> AcquisitionHeader {
        self.header
    }
}
