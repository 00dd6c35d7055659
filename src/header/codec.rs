//! Binary layout of the acquisition header (version 1, little-endian, 400 bytes)
//!
//! ```text
//! offset  field
//!      0  u16 version
//!      2  u16 reserved
//!      4  u32 measurement_uid
//!      8  u64 flags
//!     16  EncodingCounters (18 x u32)
//!     88  u32 scan_counter
//!     92  u32 acquisition_time_stamp
//!     96  u32 x3 physiology_time_stamp
//!    108  u32 number_of_samples
//!    112  u32 available_channels
//!    116  u32 active_channels
//!    120  u64 x16 channel_mask
//!    248  u32 discard_pre
//!    252  u32 discard_post
//!    256  u32 center_sample
//!    260  u32 encoding_space_ref
//!    264  u32 trajectory_dimensions
//!    268  f32 sample_time_us
//!    272  f32 x3 position
//!    284  f32 x3 read_dir
//!    296  f32 x3 phase_dir
//!    308  f32 x3 slice_dir
//!    320  f32 x3 patient_table_position
//!    332  i32 x8 user_int
//!    364  f32 x8 user_float
//!    396  4 bytes reserved
//! ```

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};

use super::{AcquisitionHeader, ACQUISITION_HEADER_VERSION};
use crate::acquisition::AcquisitionError;
use crate::counters::{EncodingCounters, ENCODING_COUNTERS_SIZE};
use crate::flags::FlagSet;

/// Encoded size of an acquisition header
pub const ACQUISITION_HEADER_SIZE: usize = 400;

const RESERVED_TAIL: usize = 4;

/// Sequential little-endian writer over a fixed buffer
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn advance(&mut self, n: usize) -> &mut [u8] {
        let start = self.pos;
        self.pos += n;
        &mut self.buf[start..self.pos]
    }

    fn u16(&mut self, v: u16) {
        LittleEndian::write_u16(self.advance(2), v);
    }

    fn u32(&mut self, v: u32) {
        LittleEndian::write_u32(self.advance(4), v);
    }

    fn u64(&mut self, v: u64) {
        LittleEndian::write_u64(self.advance(8), v);
    }

    fn i32(&mut self, v: i32) {
        LittleEndian::write_i32(self.advance(4), v);
    }

    fn f32(&mut self, v: f32) {
        LittleEndian::write_f32(self.advance(4), v);
    }

    fn bytes(&mut self, v: &[u8]) {
        self.advance(v.len()).copy_from_slice(v);
    }
}

/// Sequential little-endian reader over a fixed buffer
struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let buf = self.buf;
        let start = self.pos;
        self.pos += n;
        &buf[start..self.pos]
    }

    fn u16(&mut self) -> u16 {
        LittleEndian::read_u16(self.take(2))
    }

    fn u32(&mut self) -> u32 {
        LittleEndian::read_u32(self.take(4))
    }

    fn u64(&mut self) -> u64 {
        LittleEndian::read_u64(self.take(8))
    }

    fn i32(&mut self) -> i32 {
        LittleEndian::read_i32(self.take(4))
    }

    fn f32(&mut self) -> f32 {
        LittleEndian::read_f32(self.take(4))
    }

    fn u32_array<const N: usize>(&mut self) -> [u32; N] {
        let mut out = [0u32; N];
        out.iter_mut().for_each(|v| *v = self.u32());
        out
    }

    fn f32_array<const N: usize>(&mut self) -> [f32; N] {
        let mut out = [0f32; N];
        out.iter_mut().for_each(|v| *v = self.f32());
        out
    }
}

impl AcquisitionHeader {
    /// Encode to the fixed binary layout
    ///
    /// Encoding is byte-exact: floats are stored by bit pattern, reserved bytes are zero.
    pub fn to_bytes(&self) -> [u8; ACQUISITION_HEADER_SIZE] {
        let mut buf = [0u8; ACQUISITION_HEADER_SIZE];
        let mut w = FieldWriter::new(&mut buf);

        w.u16(self.version);
        w.u16(0);
        w.u32(self.measurement_uid);
        w.u64(self.flags.raw());
        w.bytes(&self.idx.to_bytes());
        w.u32(self.scan_counter);
        w.u32(self.acquisition_time_stamp);
        self.physiology_time_stamp.iter().for_each(|v| w.u32(*v));
        w.u32(self.number_of_samples);
        w.u32(self.available_channels);
        w.u32(self.active_channels);
        self.channel_mask.iter().for_each(|v| w.u64(*v));
        w.u32(self.discard_pre);
        w.u32(self.discard_post);
        w.u32(self.center_sample);
        w.u32(self.encoding_space_ref);
        w.u32(self.trajectory_dimensions);
        w.f32(self.sample_time_us);
        for vector in [
            &self.position,
            &self.read_dir,
            &self.phase_dir,
            &self.slice_dir,
            &self.patient_table_position,
        ] {
            vector.iter().for_each(|v| w.f32(*v));
        }
        self.user_int.iter().for_each(|v| w.i32(*v));
        self.user_float.iter().for_each(|v| w.f32(*v));

        debug_assert_eq!(w.pos + RESERVED_TAIL, ACQUISITION_HEADER_SIZE);
        buf
    }

    /// Decode from the fixed binary layout
    ///
    /// The version tag is checked before any other field is interpreted.
    ///
    /// # Errors
    ///
    /// [`AcquisitionError::Truncated`] if fewer than [`ACQUISITION_HEADER_SIZE`]
    /// bytes are given, [`AcquisitionError::MalformedHeader`] for an unknown version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AcquisitionError> {
        if bytes.len() < ACQUISITION_HEADER_SIZE {
            return Err(AcquisitionError::Truncated {
                expected: ACQUISITION_HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut r = FieldReader::new(&bytes[..ACQUISITION_HEADER_SIZE]);
        let version = r.u16();
        if version != ACQUISITION_HEADER_VERSION {
            return Err(AcquisitionError::MalformedHeader(format!(
                "unsupported header version {} (expected {})",
                version, ACQUISITION_HEADER_VERSION
            )));
        }
        let _reserved = r.u16();

        let measurement_uid = r.u32();
        let flags = FlagSet::from_raw(r.u64());

        let mut counter_bytes = [0u8; ENCODING_COUNTERS_SIZE];
        counter_bytes.copy_from_slice(r.take(ENCODING_COUNTERS_SIZE));
        let idx = EncodingCounters::from_bytes(&counter_bytes);

        let scan_counter = r.u32();
        let acquisition_time_stamp = r.u32();
        let physiology_time_stamp = r.u32_array();
        let number_of_samples = r.u32();
        let available_channels = r.u32();
        let active_channels = r.u32();

        let mut channel_mask = [0u64; super::CHANNEL_MASKS];
        channel_mask.iter_mut().for_each(|v| *v = r.u64());

        let discard_pre = r.u32();
        let discard_post = r.u32();
        let center_sample = r.u32();
        let encoding_space_ref = r.u32();
        let trajectory_dimensions = r.u32();
        let sample_time_us = r.f32();
        let position = r.f32_array();
        let read_dir = r.f32_array();
        let phase_dir = r.f32_array();
        let slice_dir = r.f32_array();
        let patient_table_position = r.f32_array();

        let mut user_int = [0i32; super::USER_INTS];
        user_int.iter_mut().for_each(|v| *v = r.i32());
        let user_float = r.f32_array();

        Ok(Self {
            version,
            flags,
            measurement_uid,
            idx,
            scan_counter,
            acquisition_time_stamp,
            physiology_time_stamp,
            number_of_samples,
            available_channels,
            active_channels,
            channel_mask,
            discard_pre,
            discard_post,
            center_sample,
            encoding_space_ref,
            trajectory_dimensions,
            sample_time_us,
            position,
            read_dir,
            phase_dir,
            slice_dir,
            patient_table_position,
            user_int,
            user_float,
        })
    }

    /// Write the binary layout to a stream
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), AcquisitionError> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read the binary layout from a stream
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, AcquisitionError> {
        let mut buf = [0u8; ACQUISITION_HEADER_SIZE];
        reader.read_exact(&mut buf)?;
        Self::from_bytes(&buf)
    }
}
