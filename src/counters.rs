//! Encoding counters: the position of one acquisition inside the
//! multi-dimensional acquisition space.
//!
//! Counters are plain ordinals. They are only meaningful relative to the
//! encoding limits declared in the [`HeaderDocument`](crate::document::HeaderDocument),
//! and the container never checks them against those limits; it only
//! guarantees that they come back exactly as written.

use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

/// Number of user-defined counter slots
pub const USER_COUNTERS: usize = 8;

/// Size of the counters block inside the binary acquisition header
pub const ENCODING_COUNTERS_SIZE: usize = (10 + USER_COUNTERS) * 4;

/// A named dimension of the acquisition space
///
/// Shared by [`EncodingCounters`] and the encoding limits of the header document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EncodingDimension {
    /// Readout direction (k-space encode step 0)
    KspaceEncodeStep0,
    /// First phase-encode direction (k-space encode step 1)
    KspaceEncodeStep1,
    /// Second phase-encode / partition direction (k-space encode step 2)
    KspaceEncodeStep2,
    /// Signal average
    Average,
    /// Slice
    Slice,
    /// Contrast (e.g. echo)
    Contrast,
    /// Cardiac or respiratory phase
    Phase,
    /// Repetition
    Repetition,
    /// Set
    Set,
    /// Segment
    Segment,
    /// User-defined dimension (0..8)
    User(u8),
}

impl EncodingDimension {
    /// The ten named (non-user) dimensions, in layout order
    pub const NAMED: [EncodingDimension; 10] = [
        EncodingDimension::KspaceEncodeStep0,
        EncodingDimension::KspaceEncodeStep1,
        EncodingDimension::KspaceEncodeStep2,
        EncodingDimension::Average,
        EncodingDimension::Slice,
        EncodingDimension::Contrast,
        EncodingDimension::Phase,
        EncodingDimension::Repetition,
        EncodingDimension::Set,
        EncodingDimension::Segment,
    ];

    /// Every dimension including all user slots
    pub fn all() -> impl Iterator<Item = EncodingDimension> {
        Self::NAMED
            .into_iter()
            .chain((0..USER_COUNTERS as u8).map(EncodingDimension::User))
    }

    /// Name used in the header document and in reports
    pub fn name(&self) -> String {
        match self {
            EncodingDimension::KspaceEncodeStep0 => "kspace_encoding_step_0".to_string(),
            EncodingDimension::KspaceEncodeStep1 => "kspace_encoding_step_1".to_string(),
            EncodingDimension::KspaceEncodeStep2 => "kspace_encoding_step_2".to_string(),
            EncodingDimension::Average => "average".to_string(),
            EncodingDimension::Slice => "slice".to_string(),
            EncodingDimension::Contrast => "contrast".to_string(),
            EncodingDimension::Phase => "phase".to_string(),
            EncodingDimension::Repetition => "repetition".to_string(),
            EncodingDimension::Set => "set".to_string(),
            EncodingDimension::Segment => "segment".to_string(),
            EncodingDimension::User(slot) => format!("user_{}", slot),
        }
    }
}

impl fmt::Display for EncodingDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ordinal indices placing one acquisition in the acquisition space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodingCounters {
    /// Readout sample index (rarely used)
    pub kspace_encode_step_0: u32,
    /// Phase-encode line
    pub kspace_encode_step_1: u32,
    /// Partition / second phase-encode line
    pub kspace_encode_step_2: u32,
    /// Signal average
    pub average: u32,
    /// Slice
    pub slice: u32,
    /// Contrast (echo)
    pub contrast: u32,
    /// Cardiac / respiratory phase
    pub phase: u32,
    /// Repetition
    pub repetition: u32,
    /// Set
    pub set: u32,
    /// Segment
    pub segment: u32,
    /// User-defined counters
    pub user: [u32; USER_COUNTERS],
}

impl EncodingCounters {
    /// All counters zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the counter of one dimension
    ///
    /// # Panics
    ///
    /// Panics if a user slot is out of range (>= 8).
    pub fn get(&self, dimension: EncodingDimension) -> u32 {
        match dimension {
            EncodingDimension::KspaceEncodeStep0 => self.kspace_encode_step_0,
            EncodingDimension::KspaceEncodeStep1 => self.kspace_encode_step_1,
            EncodingDimension::KspaceEncodeStep2 => self.kspace_encode_step_2,
            EncodingDimension::Average => self.average,
            EncodingDimension::Slice => self.slice,
            EncodingDimension::Contrast => self.contrast,
            EncodingDimension::Phase => self.phase,
            EncodingDimension::Repetition => self.repetition,
            EncodingDimension::Set => self.set,
            EncodingDimension::Segment => self.segment,
            EncodingDimension::User(slot) => self.user[slot as usize],
        }
    }

    /// Overwrite the counter of one dimension
    ///
    /// # Panics
    ///
    /// Panics if a user slot is out of range (>= 8).
    pub fn set(&mut self, dimension: EncodingDimension, value: u32) {
        let slot = match dimension {
            EncodingDimension::KspaceEncodeStep0 => &mut self.kspace_encode_step_0,
            EncodingDimension::KspaceEncodeStep1 => &mut self.kspace_encode_step_1,
            EncodingDimension::KspaceEncodeStep2 => &mut self.kspace_encode_step_2,
            EncodingDimension::Average => &mut self.average,
            EncodingDimension::Slice => &mut self.slice,
            EncodingDimension::Contrast => &mut self.contrast,
            EncodingDimension::Phase => &mut self.phase,
            EncodingDimension::Repetition => &mut self.repetition,
            EncodingDimension::Set => &mut self.set,
            EncodingDimension::Segment => &mut self.segment,
            EncodingDimension::User(slot) => &mut self.user[slot as usize],
        };
        *slot = value;
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(mut self, dimension: EncodingDimension, value: u32) -> Self {
        self.set(dimension, value);
        self
    }

    /// Write the fixed 72-byte little-endian layout
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for dimension in EncodingDimension::all() {
            writer.write_u32::<LittleEndian>(self.get(dimension))?;
        }
        Ok(())
    }

    /// Read the fixed 72-byte little-endian layout
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut counters = Self::default();
        for dimension in EncodingDimension::all() {
            counters.set(dimension, reader.read_u32::<LittleEndian>()?);
        }
        Ok(counters)
    }

    /// Serialize to the fixed binary layout
    pub fn to_bytes(&self) -> [u8; ENCODING_COUNTERS_SIZE] {
        let mut bytes = [0u8; ENCODING_COUNTERS_SIZE];
        for (dimension, chunk) in EncodingDimension::all().zip(bytes.chunks_exact_mut(4)) {
            chunk.copy_from_slice(&self.get(dimension).to_le_bytes());
        }
        bytes
    }

    /// Deserialize from the fixed binary layout
    pub fn from_bytes(bytes: &[u8; ENCODING_COUNTERS_SIZE]) -> Self {
        let mut counters = Self::default();
        for (dimension, chunk) in EncodingDimension::all().zip(bytes.chunks_exact(4)) {
            counters.set(
                dimension,
                u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
            );
        }
        counters
    }
}
