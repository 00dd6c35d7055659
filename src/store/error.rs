use std::path::PathBuf;

/// Errors raised by the physical store layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No store file at the path
    #[error("Store not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A file already exists where a new store was requested
    #[error("Store already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Structural damage that is not a torn tail
    #[error("Corrupt store at offset {offset}: {reason}")]
    Corrupt {
        /// Byte offset of the offending preamble or frame
        offset: u64,
        /// What is wrong
        reason: String,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            offset,
            reason: reason.into(),
        }
    }
}
