//! # Acquisitions
//!
//! An [`Acquisition`] pairs one [`AcquisitionHeader`] with the complex samples
//! of that readout and, optionally, its k-space trajectory.
//!
//! ## Payload layout
//!
//! Samples are stored channel-major: all `number_of_samples` values of channel 0,
//! then channel 1, and so on. Sample `s` of channel `c` sits at
//! `c * number_of_samples + s`. Trajectories hold `trajectory_dimensions`
//! values per sample, sample-major.
//!
//! ```rust
//! use mrdstore::acquisition::{Acquisition, Complex32};
//! use mrdstore::header::AcquisitionHeader;
//!
//! let header = AcquisitionHeader::builder(4, 2).build();
//! let samples = vec![Complex32::new(1.0, -1.0); 8];
//!
//! let acq = Acquisition::new(header, &samples, None)?;
//! assert_eq!(acq.channel(1).len(), 4);
//!
//! // Wrong shape is rejected
//! let header = AcquisitionHeader::builder(4, 2).build();
//! assert!(Acquisition::new(header, &samples[..7], None).is_err());
//! # Ok::<(), mrdstore::acquisition::AcquisitionError>(())
//! ```

mod codec;
mod error;


pub use error::AcquisitionError;
pub use num_complex::Complex32;

use crate::counters::EncodingCounters;
use crate::flags::{AcquisitionFlag, FlagSet};
use crate::header::AcquisitionHeader;

/// One readout: header, complex samples and optional trajectory
///
/// Immutable once built; the payload is copied on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    header: AcquisitionHeader,
    samples: Vec<Complex32>,
    trajectory: Vec<f32>,
}

impl Acquisition {
    /// Build an acquisition, copying `samples` and `trajectory`
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::DataMismatch`] if `samples` does not hold
    /// `number_of_samples * active_channels` values, or if the trajectory length
    /// does not equal `trajectory_dimensions * number_of_samples`. A header that
    /// declares trajectory dimensions requires a trajectory, and one that
    /// declares none rejects it.
    pub fn new(
        header: AcquisitionHeader,
        samples: &[Complex32],
        trajectory: Option<&[f32]>,
    ) -> Result<Self, AcquisitionError> {
        Self::from_parts(header, samples.to_vec(), trajectory.map(<[f32]>::to_vec))
    }

    /// Build an acquisition from owned buffers without copying
    pub fn from_parts(
        header: AcquisitionHeader,
        samples: Vec<Complex32>,
        trajectory: Option<Vec<f32>>,
    ) -> Result<Self, AcquisitionError> {
        let expected = header.sample_count();
        if samples.len() != expected {
            return Err(AcquisitionError::DataMismatch {
                what: "sample",
                expected,
                actual: samples.len(),
            });
        }

        let trajectory = trajectory.unwrap_or_default();
        let expected = header.trajectory_len();
        if trajectory.len() != expected {
            return Err(AcquisitionError::DataMismatch {
                what: "trajectory",
                expected,
                actual: trajectory.len(),
            });
        }

        Ok(Self {
            header,
            samples,
            trajectory,
        })
    }

    /// The header
    pub fn header(&self) -> &AcquisitionHeader {
        &self.header
    }

    /// All samples, channel-major
    pub fn samples(&self) -> &[Complex32] {
        &self.samples
    }

    /// Trajectory values, if the header declares any
    pub fn trajectory(&self) -> Option<&[f32]> {
        if self.trajectory.is_empty() {
            None
        } else {
            Some(&self.trajectory)
        }
    }

    /// Samples of one channel
    ///
    /// # Panics
    ///
    /// Panics if `channel >= active_channels`.
    pub fn channel(&self, channel: usize) -> &[Complex32] {
        let n = self.number_of_samples();
        &self.samples[channel * n..(channel + 1) * n]
    }

    /// Iterate over the channels
    pub fn channels(&self) -> impl Iterator<Item = &[Complex32]> {
        self.samples.chunks_exact(self.number_of_samples().max(1))
    }

    /// One sample, or `None` if either index is out of range
    pub fn sample(&self, channel: usize, sample: usize) -> Option<Complex32> {
        if channel >= self.active_channels() || sample >= self.number_of_samples() {
            return None;
        }
        self.samples
            .get(channel * self.number_of_samples() + sample)
            .copied()
    }

    /// Samples per channel
    pub fn number_of_samples(&self) -> usize {
        self.header.number_of_samples as usize
    }

    /// Channels in the payload
    pub fn active_channels(&self) -> usize {
        self.header.active_channels as usize
    }

    /// Status flags
    pub fn flags(&self) -> FlagSet {
        self.header.flags
    }

    /// Shorthand for `self.flags().test(flag)`
    pub fn is_flag_set(&self, flag: AcquisitionFlag) -> bool {
        self.header.flags.test(flag)
    }

    /// Encoding counters
    pub fn counters(&self) -> &EncodingCounters {
        &self.header.idx
    }

    /// Split into owned header, samples and trajectory
    pub fn into_parts(self) -> (AcquisitionHeader, Vec<Complex32>, Option<Vec<f32>>) {
        let trajectory = if self.trajectory.is_empty() {
            None
        } else {
            Some(self.trajectory)
        };
        (self.header, self.samples, trajectory)
    }
}
