//! Preamble and frame encoding
//!
//! ```text
//! preamble (16 bytes):  "MRDSTORE" | u32 format version | u32 reserved
//! frame header (28 bytes):
//!     0  "MRDF"
//!     4  u8 kind
//!     5  3 bytes reserved
//!     8  u32 label_len
//!    12  u64 body_len
//!    20  u32 crc32(label || body)
//!    24  u32 crc32(header bytes 0..24)
//! followed by label_len bytes of UTF-8 label and body_len bytes of body
//! ```
//!
//! A complete header is trusted only once its own checksum matches, so a
//! damaged length field can never pass for a frame cut short by a crash.

use byteorder::{ByteOrder, LittleEndian};
use crc32fast::Hasher as Crc32;

use super::StoreError;

/// Magic bytes at the start of every store file
pub const STORE_MAGIC: &[u8; 8] = b"MRDSTORE";

/// Store format version written and accepted by this crate
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Size of the file preamble
pub const PREAMBLE_SIZE: usize = 16;

/// Size of a frame header
pub const FRAME_HEADER_SIZE: usize = 28;

/// Header bytes covered by the header checksum
const FRAME_HEADER_CHECKED: usize = 24;

/// Tag at the start of every frame
pub const FRAME_TAG: &[u8; 4] = b"MRDF";

/// Upper bound on label length in bytes
pub const MAX_LABEL_LEN: usize = 1024;

/// Record type of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    /// Declares a dataset label; empty body
    Declaration = 1,
    /// One encoded acquisition
    Acquisition = 2,
    /// Header document as UTF-8 JSON
    Document = 3,
}

impl FrameKind {
    /// Parse the kind byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(FrameKind::Declaration),
            2 => Some(FrameKind::Acquisition),
            3 => Some(FrameKind::Document),
            _ => None,
        }
    }

    /// Short name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            FrameKind::Declaration => "declaration",
            FrameKind::Acquisition => "acquisition",
            FrameKind::Document => "document",
        }
    }
}

/// Encoded preamble of a new store
pub(crate) fn preamble() -> [u8; PREAMBLE_SIZE] {
    let mut buf = [0u8; PREAMBLE_SIZE];
    buf[..8].copy_from_slice(STORE_MAGIC);
    LittleEndian::write_u32(&mut buf[8..12], STORE_FORMAT_VERSION);
    buf
}

/// Check a preamble read from disk
pub(crate) fn check_preamble(buf: &[u8]) -> Result<(), StoreError> {
    if buf.len() < PREAMBLE_SIZE || &buf[..8] != STORE_MAGIC {
        return Err(StoreError::corrupt(0, "missing MRDSTORE magic"));
    }
    let version = LittleEndian::read_u32(&buf[8..12]);
    if version != STORE_FORMAT_VERSION {
        return Err(StoreError::corrupt(
            0,
            format!(
                "unsupported store format version {} (expected {})",
                version, STORE_FORMAT_VERSION
            ),
        ));
    }
    Ok(())
}

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameHeader {
    pub kind: FrameKind,
    pub label_len: u32,
    pub body_len: u64,
    pub crc: u32,
}

impl FrameHeader {
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut buf = [0u8; FRAME_HEADER_SIZE];
        buf[..4].copy_from_slice(FRAME_TAG);
        buf[4] = self.kind as u8;
        LittleEndian::write_u32(&mut buf[8..12], self.label_len);
        LittleEndian::write_u64(&mut buf[12..20], self.body_len);
        LittleEndian::write_u32(&mut buf[20..24], self.crc);
        let header_crc = crc32fast::hash(&buf[..FRAME_HEADER_CHECKED]);
        LittleEndian::write_u32(&mut buf[FRAME_HEADER_CHECKED..], header_crc);
        buf
    }

    /// Decode a header located at `offset` (used for error reporting only)
    pub fn from_bytes(buf: &[u8; FRAME_HEADER_SIZE], offset: u64) -> Result<Self, StoreError> {
        let stored = LittleEndian::read_u32(&buf[FRAME_HEADER_CHECKED..]);
        if crc32fast::hash(&buf[..FRAME_HEADER_CHECKED]) != stored {
            return Err(StoreError::corrupt(offset, "frame header checksum mismatch"));
        }
        if &buf[..4] != FRAME_TAG {
            return Err(StoreError::corrupt(offset, "bad frame tag"));
        }
        let kind = FrameKind::from_u8(buf[4])
            .ok_or_else(|| StoreError::corrupt(offset, format!("unknown frame kind {}", buf[4])))?;

        Ok(Self {
            kind,
            label_len: LittleEndian::read_u32(&buf[8..12]),
            body_len: LittleEndian::read_u64(&buf[12..20]),
            crc: LittleEndian::read_u32(&buf[20..24]),
        })
    }

    /// Bytes of label and body following the header
    pub fn payload_len(&self) -> u64 {
        self.label_len as u64 + self.body_len
    }

    /// Total frame size including the header
    pub fn frame_len(&self) -> u64 {
        FRAME_HEADER_SIZE as u64 + self.payload_len()
    }
}

/// Checksum over label and body
pub(crate) fn checksum(label: &[u8], body: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(label);
    hasher.update(body);
    hasher.finalize()
}

/// Encode a complete frame
pub(crate) fn encode_frame(kind: FrameKind, label: &str, body: &[u8]) -> Vec<u8> {
    let header = FrameHeader {
        kind,
        label_len: label.len() as u32,
        body_len: body.len() as u64,
        crc: checksum(label.as_bytes(), body),
    };

    let mut buf = Vec::with_capacity(header.frame_len() as usize);
    buf.extend_from_slice(&header.to_bytes());
    buf.extend_from_slice(label.as_bytes());
    buf.extend_from_slice(body);
    buf
}
