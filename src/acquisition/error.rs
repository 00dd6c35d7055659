/// Errors raised while building, encoding or decoding acquisitions
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// Header version unsupported or a size field out of range
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Payload shape disagrees with the header
    #[error("Data mismatch: header declares {expected} {what} values, got {actual}")]
    DataMismatch {
        /// Which part of the payload disagrees ("sample" or "trajectory")
        what: &'static str,
        /// Count implied by the header
        expected: usize,
        /// Count supplied
        actual: usize,
    },

    /// Encoded record shorter than the header declares
    #[error("Truncated record: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Encoded record longer than the header declares
    #[error("Trailing bytes in record: expected {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// I/O error while streaming a record
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
