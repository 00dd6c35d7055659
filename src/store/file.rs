//! Store file handle with positional I/O
//!
//! Every read and write addresses an absolute offset, so reads never move a
//! shared cursor and can be issued through `&self`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use super::frame::{
    check_preamble, checksum, encode_frame, preamble, FrameHeader, FrameKind, FRAME_HEADER_SIZE,
    MAX_LABEL_LEN, PREAMBLE_SIZE,
};
use super::{StoreConfig, StoreError, SyncPolicy};

/// Location of one frame in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameRef {
    pub kind: FrameKind,
    pub offset: u64,
    pub label_len: u32,
    pub body_len: u64,
    pub crc: u32,
}

impl FrameRef {
    fn payload_offset(&self) -> u64 {
        self.offset + FRAME_HEADER_SIZE as u64
    }

    pub fn end(&self) -> u64 {
        self.payload_offset() + self.label_len as u64 + self.body_len
    }
}

/// A frame found by scanning, with its decoded label
#[derive(Debug, Clone)]
pub(crate) struct ScannedFrame {
    pub label: String,
    pub frame: FrameRef,
}

/// Result of scanning a byte range of the store
#[derive(Debug, Clone, Default)]
pub(crate) struct Scan {
    pub frames: Vec<ScannedFrame>,
    /// End of the last complete frame
    pub end: u64,
    /// File length at scan time
    pub file_len: u64,
}

impl Scan {
    /// Bytes after the last complete frame
    pub fn torn_bytes(&self) -> u64 {
        self.file_len.saturating_sub(self.end)
    }
}

/// Open store file
#[derive(Debug)]
pub(crate) struct StoreFile {
    file: File,
    path: PathBuf,
    len: u64,
    config: StoreConfig,
}

impl StoreFile {
    /// Create a new store containing only the preamble
    ///
    /// Fails with [`StoreError::AlreadyExists`] unless `truncate` is set.
    pub fn create(path: &Path, config: &StoreConfig, truncate: bool) -> Result<Self, StoreError> {
        if config.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true);
        if truncate {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let file = options.open(path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_path_buf()),
            _ => StoreError::IoError(e),
        })?;

        write_all_at(&file, &preamble(), 0)?;
        if config.sync == SyncPolicy::EveryRecord {
            file.sync_all()?;
        }
        debug!("Created store {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
            len: PREAMBLE_SIZE as u64,
            config: config.clone(),
        })
    }

    /// Open an existing store and scan it
    ///
    /// A torn tail is ignored; writable handles also truncate it away.
    pub fn open(
        path: &Path,
        config: &StoreConfig,
        writable: bool,
    ) -> Result<(Self, Scan), StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
                _ => StoreError::IoError(e),
            })?;

        let file_len = file.metadata()?.len();
        if file_len < PREAMBLE_SIZE as u64 {
            return Err(StoreError::corrupt(0, "file shorter than the store preamble"));
        }
        let mut buf = [0u8; PREAMBLE_SIZE];
        read_exact_at(&file, &mut buf, 0)?;
        check_preamble(&buf)?;

        let mut store = Self {
            file,
            path: path.to_path_buf(),
            len: PREAMBLE_SIZE as u64,
            config: config.clone(),
        };

        let scan = store.scan_from(PREAMBLE_SIZE as u64)?;
        if scan.torn_bytes() > 0 {
            warn!(
                "Ignoring {} torn bytes at offset {} in {}",
                scan.torn_bytes(),
                scan.end,
                path.display()
            );
            if writable {
                store.file.set_len(scan.end)?;
            }
        }
        store.len = scan.end;

        Ok((store, scan))
    }

    /// Scan complete frames from `start` to the current end of file
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] for a complete frame header whose checksum fails,
    /// a bad tag or kind, an oversized or non-UTF-8 label, or a payload
    /// checksum mismatch on any frame except the final one. Only a frame with
    /// an intact header that runs past the end of file counts as torn.
    pub fn scan_from(&self, start: u64) -> Result<Scan, StoreError> {
        let file_len = self.file.metadata()?.len();
        let mut frames = Vec::new();
        let mut pos = start;

        while file_len.saturating_sub(pos) >= FRAME_HEADER_SIZE as u64 {
            let mut header_buf = [0u8; FRAME_HEADER_SIZE];
            read_exact_at(&self.file, &mut header_buf, pos)?;
            let header = FrameHeader::from_bytes(&header_buf, pos)?;

            if header.label_len as usize > MAX_LABEL_LEN {
                return Err(StoreError::corrupt(
                    pos,
                    format!("label length {} exceeds {}", header.label_len, MAX_LABEL_LEN),
                ));
            }

            let end = match pos.checked_add(header.frame_len()) {
                Some(end) if end <= file_len => end,
                _ => break,
            };

            let mut payload = vec![0u8; header.payload_len() as usize];
            read_exact_at(&self.file, &mut payload, pos + FRAME_HEADER_SIZE as u64)?;
            let (label, body) = payload.split_at(header.label_len as usize);

            if checksum(label, body) != header.crc {
                if end == file_len {
                    break;
                }
                return Err(StoreError::corrupt(pos, "frame checksum mismatch"));
            }

            let label = std::str::from_utf8(label)
                .map_err(|_| StoreError::corrupt(pos, "frame label is not valid UTF-8"))?
                .to_string();

            frames.push(ScannedFrame {
                label,
                frame: FrameRef {
                    kind: header.kind,
                    offset: pos,
                    label_len: header.label_len,
                    body_len: header.body_len,
                    crc: header.crc,
                },
            });
            pos = end;
        }

        Ok(Scan {
            frames,
            end: pos,
            file_len,
        })
    }

    /// Append one frame at the logical end of the store
    ///
    /// On failure the file is cut back to its previous length, so no partial
    /// frame remains visible.
    pub fn append(
        &mut self,
        kind: FrameKind,
        label: &str,
        body: &[u8],
    ) -> Result<FrameRef, StoreError> {
        let frame = encode_frame(kind, label, body);
        let offset = self.len;

        let mut written = write_all_at(&self.file, &frame, offset);
        if written.is_ok() && self.config.sync == SyncPolicy::EveryRecord {
            written = self.file.sync_data();
        }
        if let Err(e) = written {
            if let Err(rollback) = self.file.set_len(offset) {
                error!(
                    "Failed to roll back partial frame at offset {} in {}: {}",
                    offset,
                    self.path.display(),
                    rollback
                );
            }
            return Err(e.into());
        }

        self.len = offset + frame.len() as u64;
        Ok(FrameRef {
            kind,
            offset,
            label_len: label.len() as u32,
            body_len: body.len() as u64,
            crc: checksum(label.as_bytes(), body),
        })
    }

    /// Read and verify the body of a frame
    pub fn read_body(&self, frame: &FrameRef) -> Result<Vec<u8>, StoreError> {
        let mut payload = vec![0u8; (frame.label_len as u64 + frame.body_len) as usize];
        read_exact_at(&self.file, &mut payload, frame.payload_offset())?;

        let (label, body) = payload.split_at(frame.label_len as usize);
        if checksum(label, body) != frame.crc {
            return Err(StoreError::corrupt(frame.offset, "frame checksum mismatch"));
        }

        Ok(payload.split_off(frame.label_len as usize))
    }

    /// Flush data and metadata to stable storage
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Logical length: end of the last complete frame
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Advance the logical end after picking up frames appended elsewhere
    pub fn set_scanned_end(&mut self, end: u64) {
        self.len = end;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                let rest = buf;
                buf = &mut rest[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ))
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
