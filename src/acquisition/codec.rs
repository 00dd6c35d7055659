//! Record encoding of a complete acquisition
//!
//! ```text
//! [AcquisitionHeader: 400 bytes]
//! [trajectory: trajectory_dimensions * number_of_samples x f32]
//! [samples: number_of_samples * active_channels x (f32 re, f32 im)]
//! ```
//!
//! All values little-endian. The header is decoded and validated before the
//! payload sizes it declares are trusted.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use super::{Acquisition, AcquisitionError, Complex32};
use crate::header::{AcquisitionHeader, ACQUISITION_HEADER_SIZE};

const F32_SIZE: usize = 4;
const COMPLEX_SIZE: usize = 2 * F32_SIZE;

/// f32 values read per chunk when streaming a payload
const READ_CHUNK: usize = 64 * 1024;

impl Acquisition {
    /// Encoded size of an acquisition with this header
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::MalformedHeader`] if the sizes the header
    /// declares do not fit in memory addresses.
    pub fn encoded_len(header: &AcquisitionHeader) -> Result<usize, AcquisitionError> {
        let samples = u64::from(header.number_of_samples);
        let trajectory_bytes = u64::from(header.trajectory_dimensions)
            .checked_mul(samples)
            .and_then(|n| n.checked_mul(F32_SIZE as u64));
        let sample_bytes = samples
            .checked_mul(u64::from(header.active_channels))
            .and_then(|n| n.checked_mul(COMPLEX_SIZE as u64));

        trajectory_bytes
            .zip(sample_bytes)
            .and_then(|(t, s)| t.checked_add(s))
            .and_then(|n| n.checked_add(ACQUISITION_HEADER_SIZE as u64))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                AcquisitionError::MalformedHeader(format!(
                    "payload of {} samples x {} channels ({} trajectory dimensions) is too large",
                    header.number_of_samples,
                    header.active_channels,
                    header.trajectory_dimensions
                ))
            })
    }

    /// Encode header, trajectory and samples into one record
    pub fn encode(&self) -> Vec<u8> {
        let len = ACQUISITION_HEADER_SIZE
            + self.trajectory.len() * F32_SIZE
            + self.samples.len() * COMPLEX_SIZE;
        let mut buf = vec![0u8; len];
        buf[..ACQUISITION_HEADER_SIZE].copy_from_slice(&self.header.to_bytes());

        let (trajectory_bytes, sample_bytes) =
            buf[ACQUISITION_HEADER_SIZE..].split_at_mut(self.trajectory.len() * F32_SIZE);

        LittleEndian::write_f32_into(&self.trajectory, trajectory_bytes);

        for (value, chunk) in self
            .samples
            .iter()
            .zip(sample_bytes.chunks_exact_mut(COMPLEX_SIZE))
        {
            LittleEndian::write_f32(&mut chunk[..F32_SIZE], value.re);
            LittleEndian::write_f32(&mut chunk[F32_SIZE..], value.im);
        }

        buf
    }

    /// Decode a record produced by [`encode`](Self::encode)
    ///
    /// # Errors
    ///
    /// - [`AcquisitionError::MalformedHeader`] if the header is unsupported or invalid
    /// - [`AcquisitionError::Truncated`] / [`AcquisitionError::TrailingBytes`] if the
    ///   record length disagrees with the header
    pub fn decode(bytes: &[u8]) -> Result<Self, AcquisitionError> {
        let header = AcquisitionHeader::from_bytes(bytes)?;
        header.validate()?;

        let expected = Self::encoded_len(&header)?;
        if bytes.len() < expected {
            return Err(AcquisitionError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(AcquisitionError::TrailingBytes {
                expected,
                actual: bytes.len(),
            });
        }

        let mut reader = &bytes[ACQUISITION_HEADER_SIZE..];
        Self::read_payload(header, &mut reader)
    }

    /// Read a record from a stream
    ///
    /// Memory grows with the bytes actually read, not with the counts the
    /// header declares.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, AcquisitionError> {
        let header = AcquisitionHeader::read_from(reader)?;
        header.validate()?;
        Self::encoded_len(&header)?;
        Self::read_payload(header, reader)
    }

    /// Read the payload of a header whose encoded length is known to fit
    fn read_payload<R: Read>(
        header: AcquisitionHeader,
        reader: &mut R,
    ) -> Result<Self, AcquisitionError> {
        let trajectory = read_f32s(reader, header.trajectory_len())?;
        let interleaved = read_f32s(reader, header.sample_count() * 2)?;
        let samples = interleaved
            .chunks_exact(2)
            .map(|pair| Complex32::new(pair[0], pair[1]))
            .collect();

        Ok(Self {
            header,
            samples,
            trajectory,
        })
    }
}

fn read_f32s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f32>, AcquisitionError> {
    let mut values = Vec::with_capacity(count.min(READ_CHUNK));
    while values.len() < count {
        let start = values.len();
        let chunk = (count - start).min(READ_CHUNK);
        values.resize(start + chunk, 0.0);
        reader.read_f32_into::<LittleEndian>(&mut values[start..])?;
    }
    Ok(values)
}
